//! Contacts list screen.
//!
//! Joins the full contact list with the local search text and exposes the
//! filtered result.

use super::{Controller, Reducer, Transition};
use crate::model::contact::{Contact, ContactId};
use crate::store::{Command, ContactsStore};

pub const NO_CONTACTS_DESCRIPTION: &str = "You do not have any contacts";
pub const NO_SEARCH_RESULTS_DESCRIPTION: &str = "No contacts found, change your search text";

pub type ContactsController = Controller<ContactsScreen>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// True until the first list arrives from the store.
    pub is_loading: bool,
    pub search_text: String,
    /// Contacts matching `search_text`, in store order.
    pub contacts: Vec<Contact>,
    pub empty_state_description: String,
}

impl Default for State {
    fn default() -> Self {
        Self {
            is_loading: true,
            search_text: String::new(),
            contacts: Vec::new(),
            empty_state_description: NO_CONTACTS_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SearchTextChanged(String),
    DeleteContact(ContactId),
    ToggleFavorite(ContactId),
    AddContact,
    ShowContactDetail(ContactId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AddContact,
    ShowContactDetail(ContactId),
}

#[derive(Debug, Default)]
pub struct Sources {
    all: Option<Vec<Contact>>,
}

#[derive(Debug, Default)]
pub struct ContactsScreen;

impl ContactsScreen {
    /// Builds the controller and subscribes it to every contact.
    pub fn into_controller(self, store: &ContactsStore) -> ContactsController {
        let mut controller = Controller::new(self, State::default(), store.clone());
        controller.bind("all_contacts", store.observe_all(), |sources, contacts| {
            sources.all = Some(contacts);
        });
        controller
    }
}

impl Reducer for ContactsScreen {
    const NAME: &'static str = "contacts";

    type State = State;
    type Sources = Sources;
    type Action = Action;
    type Event = Event;

    fn reduce(&self, state: &State, _sources: &Sources, action: Action) -> Transition<State, Event> {
        match action {
            Action::SearchTextChanged(search_text) => Transition::new(State {
                search_text,
                ..state.clone()
            }),
            Action::DeleteContact(id) => {
                Transition::new(state.clone()).persist(Command::Delete(id))
            }
            Action::ToggleFavorite(id) => {
                let transition = Transition::new(state.clone());
                match state.contacts.iter().find(|contact| contact.id == Some(id)) {
                    Some(contact) => transition.persist(Command::Save(Contact {
                        is_favorite: !contact.is_favorite,
                        ..contact.clone()
                    })),
                    None => transition,
                }
            }
            Action::AddContact => Transition::new(state.clone()).emit(Event::AddContact),
            Action::ShowContactDetail(id) => {
                Transition::new(state.clone()).emit(Event::ShowContactDetail(id))
            }
        }
    }

    fn derive(&self, state: State, sources: &Sources) -> Transition<State, Event> {
        let Some(all) = &sources.all else {
            return Transition::new(state);
        };

        let contacts = filter_contacts(all, &state.search_text);
        let empty_state_description = if state.search_text.is_empty() {
            NO_CONTACTS_DESCRIPTION
        } else {
            NO_SEARCH_RESULTS_DESCRIPTION
        };

        Transition::new(State {
            is_loading: false,
            contacts,
            empty_state_description: empty_state_description.to_string(),
            ..state
        })
    }
}

/// Case-insensitive substring match on first name, last name or phone.
pub fn filter_contacts(contacts: &[Contact], search_text: &str) -> Vec<Contact> {
    let needle = search_text.to_lowercase();
    contacts
        .iter()
        .filter(|contact| {
            [&contact.first_name, &contact.last_name, &contact.phone_number]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
