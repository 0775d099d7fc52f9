//! Add/edit contact screen.
//!
//! # Invariants
//! - The mode is fixed at construction and never changes.
//! - Creating: primary button enabled iff all three fields are non-blank.
//! - Editing: primary button enabled iff some field is non-blank and differs
//!   from the loaded contact.
//! - Text fields are filled from the store once; later row updates only move
//!   the comparison baseline.
//! - A row deleted after loading keeps its last baseline; saving re-inserts
//!   it under the same id.

use super::{Controller, Reducer, Transition};
use crate::model::contact::{Contact, ContactId};
use crate::store::{Command, ContactsStore};

pub const DEFAULT_PHONE_PREFIX: &str = "+421";
pub const ADD_TITLE: &str = "Add new contact";
pub const ADD_BUTTON_TITLE: &str = "Save contact";
pub const EDIT_TITLE: &str = "Edit contact";
pub const EDIT_BUTTON_TITLE: &str = "Save changes";

pub type AddOrEditController = Controller<AddOrEditScreen>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Creating,
    Editing(ContactId),
}

impl Mode {
    /// Interprets a navigation argument.
    ///
    /// `INVALID_CONTACT_ID`, like any other non-positive value no row can
    /// carry, selects `Creating`.
    pub fn from_arg(contact_id: ContactId) -> Self {
        if contact_id <= 0 {
            Self::Creating
        } else {
            Self::Editing(contact_id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub is_loading: bool,
    pub title: String,
    pub primary_button_title: String,
    pub primary_button_enabled: bool,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FirstNameChanged(String),
    LastNameChanged(String),
    PhoneNumberChanged(String),
    PrimaryButtonClick,
    NavigateUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Close,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Row {
    #[default]
    Pending,
    Missing,
    Found,
}

#[derive(Debug, Default)]
pub struct Sources {
    row: Row,
    /// Last stored version of the edited contact.
    baseline: Option<Contact>,
}

impl Sources {
    fn observe(&mut self, contact: Option<Contact>) {
        match contact {
            Some(contact) => {
                self.row = Row::Found;
                self.baseline = Some(contact);
            }
            None => self.row = Row::Missing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddOrEditScreen {
    mode: Mode,
    phone_prefix: String,
}

impl AddOrEditScreen {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            phone_prefix: DEFAULT_PHONE_PREFIX.to_string(),
        }
    }

    /// Screen for a navigation argument; see [`Mode::from_arg`].
    pub fn for_contact(contact_id: ContactId) -> Self {
        Self::new(Mode::from_arg(contact_id))
    }

    /// Overrides the text pre-filled into the phone field when creating.
    pub fn with_phone_prefix(mut self, phone_prefix: impl Into<String>) -> Self {
        self.phone_prefix = phone_prefix.into();
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn initial_state(&self) -> State {
        match self.mode {
            Mode::Creating => State {
                is_loading: false,
                title: ADD_TITLE.to_string(),
                primary_button_title: ADD_BUTTON_TITLE.to_string(),
                primary_button_enabled: false,
                first_name: String::new(),
                last_name: String::new(),
                phone_number: self.phone_prefix.clone(),
            },
            Mode::Editing(_) => State {
                is_loading: true,
                title: EDIT_TITLE.to_string(),
                primary_button_title: EDIT_BUTTON_TITLE.to_string(),
                primary_button_enabled: false,
                first_name: String::new(),
                last_name: String::new(),
                phone_number: String::new(),
            },
        }
    }

    /// Builds the controller; in edit mode it follows the edited row.
    pub fn into_controller(self, store: &ContactsStore) -> AddOrEditController {
        let mode = self.mode;
        let initial = self.initial_state();
        let mut controller = Controller::new(self, initial, store.clone());
        if let Mode::Editing(id) = mode {
            controller.bind("edited_contact", store.observe_one(id), Sources::observe);
        }
        controller
    }

    fn primary_click(&self, state: &State, sources: &Sources) -> Transition<State, Event> {
        let transition = Transition::new(state.clone());
        if !state.primary_button_enabled {
            return transition;
        }

        let contact = match (self.mode, &sources.baseline) {
            (Mode::Creating, _) => Contact::new(
                state.first_name.as_str(),
                state.last_name.as_str(),
                state.phone_number.as_str(),
            ),
            (Mode::Editing(id), Some(baseline)) => Contact {
                id: Some(id),
                first_name: state.first_name.clone(),
                last_name: state.last_name.clone(),
                phone_number: state.phone_number.clone(),
                ..baseline.clone()
            },
            (Mode::Editing(_), None) => return transition,
        };

        transition
            .persist(Command::Save(contact))
            .emit(Event::Close)
    }
}

impl Reducer for AddOrEditScreen {
    const NAME: &'static str = "add_or_edit";

    type State = State;
    type Sources = Sources;
    type Action = Action;
    type Event = Event;

    fn reduce(&self, state: &State, sources: &Sources, action: Action) -> Transition<State, Event> {
        match action {
            Action::FirstNameChanged(first_name) => Transition::new(State {
                first_name,
                ..state.clone()
            }),
            Action::LastNameChanged(last_name) => Transition::new(State {
                last_name,
                ..state.clone()
            }),
            Action::PhoneNumberChanged(phone_number) => Transition::new(State {
                phone_number,
                ..state.clone()
            }),
            Action::PrimaryButtonClick => self.primary_click(state, sources),
            Action::NavigateUp => Transition::new(state.clone()).emit(Event::Close),
        }
    }

    fn derive(&self, state: State, sources: &Sources) -> Transition<State, Event> {
        match (self.mode, sources.row) {
            (Mode::Creating, _) => {
                let primary_button_enabled = is_filled(&state.first_name)
                    && is_filled(&state.last_name)
                    && is_filled(&state.phone_number);
                Transition::new(State {
                    primary_button_enabled,
                    ..state
                })
            }
            (Mode::Editing(_), Row::Pending) => Transition::new(state),
            (Mode::Editing(_), Row::Missing) if state.is_loading => Transition::new(State {
                is_loading: false,
                primary_button_enabled: false,
                ..state
            })
            .emit(Event::Close),
            (Mode::Editing(_), _) => {
                let Some(baseline) = sources.baseline.as_ref() else {
                    return Transition::new(State {
                        primary_button_enabled: false,
                        ..state
                    });
                };
                let state = if state.is_loading {
                    State {
                        is_loading: false,
                        first_name: baseline.first_name.clone(),
                        last_name: baseline.last_name.clone(),
                        phone_number: baseline.phone_number.clone(),
                        ..state
                    }
                } else {
                    state
                };
                let primary_button_enabled = is_changed(&state.first_name, &baseline.first_name)
                    || is_changed(&state.last_name, &baseline.last_name)
                    || is_changed(&state.phone_number, &baseline.phone_number);
                Transition::new(State {
                    primary_button_enabled,
                    ..state
                })
            }
        }
    }
}

fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_changed(value: &str, original: &str) -> bool {
    is_filled(value) && value != original
}
