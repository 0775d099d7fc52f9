//! Favorites screen and its "add favorites" dialog.
//!
//! # Invariants
//! - The dialog list is a snapshot of non-favorites taken when it opens.
//! - Save is enabled iff at least one dialog item is selected.
//! - Saving only promotes selected ids; closing or saving clears the
//!   transient selection.

use super::{Controller, Reducer, Transition};
use crate::model::contact::{Contact, ContactId};
use crate::store::{Command, ContactsStore};

pub type FavoritesController = Controller<FavoritesScreen>;

/// Selectable row of the "add favorites" dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFavoriteContact {
    pub id: ContactId,
    pub name: String,
    pub is_selected: bool,
}

impl AddFavoriteContact {
    fn from_contact(contact: &Contact) -> Option<Self> {
        Some(Self {
            id: contact.id?,
            name: contact.full_name(),
            is_selected: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// True until both favorite and non-favorite lists have arrived.
    pub is_loading: bool,
    pub contacts: Vec<Contact>,
    pub add_favorite_contacts: Vec<AddFavoriteContact>,
    pub save_favorites_button_enabled: bool,
    pub show_add_favorites_dialog: bool,
    /// Shown only while some contact is not a favorite yet.
    pub add_more_contacts_button_visible: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            is_loading: true,
            contacts: Vec::new(),
            add_favorite_contacts: Vec::new(),
            save_favorites_button_enabled: false,
            show_add_favorites_dialog: false,
            add_more_contacts_button_visible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowContactDetail(ContactId),
    AddFavoritesClick,
    AddFavoritesDialogClose,
    AddToFavoriteCheckedChange(ContactId),
    SaveFavoritesClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ShowContactDetail(ContactId),
}

#[derive(Debug, Default)]
pub struct Sources {
    favorites: Option<Vec<Contact>>,
    others: Option<Vec<Contact>>,
}

#[derive(Debug, Default)]
pub struct FavoritesScreen;

impl FavoritesScreen {
    /// Builds the controller joined with both halves of the favorite split.
    pub fn into_controller(self, store: &ContactsStore) -> FavoritesController {
        let mut controller = Controller::new(self, State::default(), store.clone());
        controller.bind(
            "favorite_contacts",
            store.observe_by_favorite(true),
            |sources, contacts| sources.favorites = Some(contacts),
        );
        controller.bind(
            "other_contacts",
            store.observe_by_favorite(false),
            |sources, contacts| sources.others = Some(contacts),
        );
        controller
    }
}

impl Reducer for FavoritesScreen {
    const NAME: &'static str = "favorites";

    type State = State;
    type Sources = Sources;
    type Action = Action;
    type Event = Event;

    fn reduce(&self, state: &State, sources: &Sources, action: Action) -> Transition<State, Event> {
        match action {
            Action::ShowContactDetail(id) => {
                Transition::new(state.clone()).emit(Event::ShowContactDetail(id))
            }
            Action::AddFavoritesClick => Transition::new(State {
                add_favorite_contacts: sources
                    .others
                    .iter()
                    .flatten()
                    .filter_map(AddFavoriteContact::from_contact)
                    .collect(),
                show_add_favorites_dialog: true,
                save_favorites_button_enabled: false,
                ..state.clone()
            }),
            Action::AddFavoritesDialogClose => Transition::new(closed_dialog(state)),
            Action::AddToFavoriteCheckedChange(id) => {
                let add_favorite_contacts: Vec<_> = state
                    .add_favorite_contacts
                    .iter()
                    .map(|item| {
                        if item.id == id {
                            AddFavoriteContact {
                                is_selected: !item.is_selected,
                                ..item.clone()
                            }
                        } else {
                            item.clone()
                        }
                    })
                    .collect();
                let save_favorites_button_enabled =
                    add_favorite_contacts.iter().any(|item| item.is_selected);
                Transition::new(State {
                    add_favorite_contacts,
                    save_favorites_button_enabled,
                    ..state.clone()
                })
            }
            Action::SaveFavoritesClick => {
                let selected: Vec<ContactId> = state
                    .add_favorite_contacts
                    .iter()
                    .filter(|item| item.is_selected)
                    .map(|item| item.id)
                    .collect();
                let transition = Transition::new(closed_dialog(state));
                if selected.is_empty() {
                    transition
                } else {
                    transition.persist(Command::SetFavorites(selected))
                }
            }
        }
    }

    fn derive(&self, state: State, sources: &Sources) -> Transition<State, Event> {
        Transition::new(State {
            is_loading: sources.favorites.is_none() || sources.others.is_none(),
            contacts: sources.favorites.clone().unwrap_or_default(),
            add_more_contacts_button_visible: sources
                .others
                .as_ref()
                .is_some_and(|others| !others.is_empty()),
            ..state
        })
    }
}

fn closed_dialog(state: &State) -> State {
    State {
        add_favorite_contacts: Vec::new(),
        save_favorites_button_enabled: false,
        show_add_favorites_dialog: false,
        ..state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Event, FavoritesScreen, Sources, State};
    use crate::controller::{Effect, Reducer};
    use crate::model::contact::Contact;
    use crate::store::Command;

    fn saved(id: i64, first: &str, is_favorite: bool) -> Contact {
        Contact {
            id: Some(id),
            is_favorite,
            ..Contact::new(first, "Test", "1")
        }
    }

    fn sources() -> Sources {
        Sources {
            favorites: Some(vec![saved(1, "Adam", true)]),
            others: Some(vec![saved(2, "Peter", false), saved(3, "Eva", false)]),
        }
    }

    fn step(state: &State, sources: &Sources, action: Action) -> (State, Vec<Effect<Event>>) {
        let screen = FavoritesScreen;
        let reduced = screen.reduce(state, sources, action);
        let derived = screen.derive(reduced.state, sources);
        (derived.state, reduced.effects)
    }

    #[test]
    fn derive_splits_favorites_and_add_button() {
        let pending = FavoritesScreen.derive(State::default(), &Sources::default()).state;
        assert!(pending.is_loading);

        let state = FavoritesScreen.derive(State::default(), &sources()).state;
        assert!(!state.is_loading);
        assert_eq!(state.contacts.len(), 1);
        assert!(state.add_more_contacts_button_visible);

        let none_left = Sources {
            favorites: Some(Vec::new()),
            others: Some(Vec::new()),
        };
        let state = FavoritesScreen.derive(State::default(), &none_left).state;
        assert!(!state.add_more_contacts_button_visible);
    }

    #[test]
    fn opening_dialog_snapshots_unselected_non_favorites() {
        let (state, _) = step(&State::default(), &sources(), Action::AddFavoritesClick);
        assert!(state.show_add_favorites_dialog);
        assert!(!state.save_favorites_button_enabled);
        assert_eq!(state.add_favorite_contacts.len(), 2);
        assert_eq!(state.add_favorite_contacts[0].name, "Peter Test");
        assert!(state.add_favorite_contacts.iter().all(|item| !item.is_selected));
    }

    #[test]
    fn toggling_changes_one_item_and_save_enablement() {
        let sources = sources();
        let (open, _) = step(&State::default(), &sources, Action::AddFavoritesClick);

        let (selected, _) = step(&open, &sources, Action::AddToFavoriteCheckedChange(3));
        assert!(selected.save_favorites_button_enabled);
        assert!(!selected.add_favorite_contacts[0].is_selected);
        assert!(selected.add_favorite_contacts[1].is_selected);

        let (cleared, _) = step(&selected, &sources, Action::AddToFavoriteCheckedChange(3));
        assert!(!cleared.save_favorites_button_enabled);
    }

    #[test]
    fn saving_commits_only_selected_ids_and_closes() {
        let sources = sources();
        let (open, _) = step(&State::default(), &sources, Action::AddFavoritesClick);
        let (selected, _) = step(&open, &sources, Action::AddToFavoriteCheckedChange(2));

        let (saved_state, effects) = step(&selected, &sources, Action::SaveFavoritesClick);
        assert_eq!(
            effects,
            vec![Effect::Persist(Command::SetFavorites(vec![2]))]
        );
        assert!(!saved_state.show_add_favorites_dialog);
        assert!(saved_state.add_favorite_contacts.is_empty());
        assert!(!saved_state.save_favorites_button_enabled);
    }

    #[test]
    fn saving_without_selection_writes_nothing() {
        let sources = sources();
        let (open, _) = step(&State::default(), &sources, Action::AddFavoritesClick);
        let (_, effects) = step(&open, &sources, Action::SaveFavoritesClick);
        assert!(effects.is_empty());
    }

    #[test]
    fn closing_dialog_clears_selection() {
        let sources = sources();
        let (open, _) = step(&State::default(), &sources, Action::AddFavoritesClick);
        let (selected, _) = step(&open, &sources, Action::AddToFavoriteCheckedChange(2));
        let (closed, effects) = step(&selected, &sources, Action::AddFavoritesDialogClose);
        assert!(effects.is_empty());
        assert!(!closed.show_add_favorites_dialog);
        assert!(closed.add_favorite_contacts.is_empty());
    }
}
