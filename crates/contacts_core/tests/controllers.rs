use contacts_core::controller::add_or_edit::{self, Mode};
use contacts_core::controller::{contacts, favorites};
use contacts_core::{
    AddOrEditScreen, Contact, ContactsScreen, ContactsStore, FavoritesScreen, INVALID_CONTACT_ID,
};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for<S: Clone>(rx: &mut watch::Receiver<S>, predicate: impl FnMut(&S) -> bool) -> S {
    timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("state should match before timeout")
        .expect("controller should still be alive")
        .clone()
}

async fn seeded_store(contacts: &[Contact]) -> ContactsStore {
    let store = ContactsStore::open_in_memory().unwrap();
    for contact in contacts {
        let _ = store.save(contact.clone());
    }
    store.flush().wait().await.unwrap();
    store
}

#[tokio::test]
async fn contacts_list_filters_by_search_text() {
    let store = seeded_store(&[
        Contact::new("Adam", "Novak", "+421900"),
        Contact::new("Peter", "Kral", "+421901"),
    ])
    .await;
    let controller = ContactsScreen.into_controller(&store);
    let mut states = controller.subscribe();

    let loaded = wait_for(&mut states, |state| !state.is_loading).await;
    assert_eq!(loaded.contacts.len(), 2);
    assert_eq!(
        loaded.empty_state_description,
        contacts::NO_CONTACTS_DESCRIPTION
    );

    controller.handle(contacts::Action::SearchTextChanged("ada".to_string()));
    let searched = controller.state();
    assert_eq!(searched.contacts.len(), 1);
    assert_eq!(searched.contacts[0].first_name, "Adam");

    controller.handle(contacts::Action::SearchTextChanged("zzz".to_string()));
    let empty = controller.state();
    assert!(empty.contacts.is_empty());
    assert_eq!(
        empty.empty_state_description,
        contacts::NO_SEARCH_RESULTS_DESCRIPTION
    );
}

#[tokio::test]
async fn contacts_list_follows_store_writes() {
    let store = seeded_store(&[Contact::new("Adam", "Novak", "1")]).await;
    let controller = ContactsScreen.into_controller(&store);
    let mut states = controller.subscribe();
    wait_for(&mut states, |state| state.contacts.len() == 1).await;

    controller.handle(contacts::Action::ToggleFavorite(1));
    let toggled = wait_for(&mut states, |state| {
        state.contacts.first().is_some_and(|contact| contact.is_favorite)
    })
    .await;
    assert_eq!(toggled.contacts[0].id, Some(1));

    let _ = store.save(Contact::new("Peter", "Kral", "2"));
    wait_for(&mut states, |state| state.contacts.len() == 2).await;

    controller.handle(contacts::Action::DeleteContact(1));
    let remaining = wait_for(&mut states, |state| state.contacts.len() == 1).await;
    assert_eq!(remaining.contacts[0].first_name, "Peter");
}

#[tokio::test]
async fn rapid_navigation_keeps_only_latest_event() {
    let store = seeded_store(&[]).await;
    let controller = ContactsScreen.into_controller(&store);

    controller.handle(contacts::Action::AddContact);
    controller.handle(contacts::Action::ShowContactDetail(3));

    assert_eq!(
        controller.events().try_recv(),
        Some(contacts::Event::ShowContactDetail(3))
    );
    assert_eq!(controller.events().try_recv(), None);
}

#[tokio::test]
async fn create_flow_saves_and_closes() {
    let store = seeded_store(&[]).await;
    let controller = AddOrEditScreen::for_contact(INVALID_CONTACT_ID)
        .with_phone_prefix("")
        .into_controller(&store);

    let initial = controller.state();
    assert!(!initial.is_loading);
    assert_eq!(initial.title, add_or_edit::ADD_TITLE);
    assert!(!initial.primary_button_enabled);

    controller.handle(add_or_edit::Action::PrimaryButtonClick);
    assert_eq!(controller.events().try_recv(), None);

    controller.handle(add_or_edit::Action::FirstNameChanged("Eva".to_string()));
    controller.handle(add_or_edit::Action::LastNameChanged("Mala".to_string()));
    controller.handle(add_or_edit::Action::PhoneNumberChanged("+421905".to_string()));
    assert!(controller.state().primary_button_enabled);

    controller.handle(add_or_edit::Action::PrimaryButtonClick);
    let event = timeout(WAIT, controller.events().recv()).await.unwrap();
    assert_eq!(event, add_or_edit::Event::Close);

    store.flush().wait().await.unwrap();
    let saved = store.contacts_by_favorite(false).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].full_name(), "Eva Mala");
    assert_eq!(saved[0].phone_number, "+421905");
}

#[tokio::test]
async fn edit_flow_loads_row_and_saves_changes() {
    let store = seeded_store(&[Contact {
        is_favorite: true,
        ..Contact::new("Adam", "Novak", "+421900")
    }])
    .await;
    let screen = AddOrEditScreen::for_contact(1);
    assert_eq!(screen.mode(), Mode::Editing(1));
    let controller = screen.into_controller(&store);
    let mut states = controller.subscribe();

    let loaded = wait_for(&mut states, |state| !state.is_loading).await;
    assert_eq!(loaded.title, add_or_edit::EDIT_TITLE);
    assert_eq!(loaded.first_name, "Adam");
    assert_eq!(loaded.phone_number, "+421900");
    assert!(!loaded.primary_button_enabled);

    controller.handle(add_or_edit::Action::LastNameChanged("Kral".to_string()));
    assert!(controller.state().primary_button_enabled);
    controller.handle(add_or_edit::Action::PrimaryButtonClick);
    assert_eq!(
        controller.events().try_recv(),
        Some(add_or_edit::Event::Close)
    );

    store.flush().wait().await.unwrap();
    let favorites = store.contacts_by_favorite(true).unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, Some(1));
    assert_eq!(favorites[0].full_name(), "Adam Kral");
}

#[tokio::test]
async fn edit_survives_row_deleted_after_load() {
    let store = seeded_store(&[Contact {
        is_favorite: true,
        ..Contact::new("Adam", "Novak", "+421900")
    }])
    .await;
    let controller = AddOrEditScreen::for_contact(1).into_controller(&store);
    let mut states = controller.subscribe();
    wait_for(&mut states, |state| !state.is_loading).await;
    controller.handle(add_or_edit::Action::LastNameChanged("Kral".to_string()));

    store.delete(1).wait().await.unwrap();
    // Let the subscription observe the deletion.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let state = controller.state();
    assert!(state.primary_button_enabled);
    assert_eq!(state.last_name, "Kral");

    controller.handle(add_or_edit::Action::PrimaryButtonClick);
    assert_eq!(
        controller.events().try_recv(),
        Some(add_or_edit::Event::Close)
    );

    store.flush().wait().await.unwrap();
    let favorites = store.contacts_by_favorite(true).unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, Some(1));
    assert_eq!(favorites[0].full_name(), "Adam Kral");
}

#[tokio::test]
async fn edit_of_missing_contact_closes_screen() {
    let store = seeded_store(&[]).await;
    let controller = AddOrEditScreen::for_contact(404).into_controller(&store);

    let event = timeout(WAIT, controller.events().recv()).await.unwrap();
    assert_eq!(event, add_or_edit::Event::Close);
}

#[tokio::test]
async fn navigate_up_closes_without_writing() {
    let store = seeded_store(&[]).await;
    let controller = AddOrEditScreen::for_contact(INVALID_CONTACT_ID).into_controller(&store);
    controller.handle(add_or_edit::Action::FirstNameChanged("Eva".to_string()));
    controller.handle(add_or_edit::Action::NavigateUp);

    assert_eq!(
        controller.events().try_recv(),
        Some(add_or_edit::Event::Close)
    );
    store.flush().wait().await.unwrap();
    assert!(store.contacts_by_favorite(false).unwrap().is_empty());
}

#[tokio::test]
async fn favorites_dialog_promotes_selected_contacts() {
    let store = seeded_store(&[
        Contact {
            is_favorite: true,
            ..Contact::new("Adam", "Novak", "1")
        },
        Contact::new("Peter", "Kral", "2"),
        Contact::new("Eva", "Mala", "3"),
    ])
    .await;
    let controller = FavoritesScreen.into_controller(&store);
    let mut states = controller.subscribe();

    let ready = wait_for(&mut states, |state| {
        state.contacts.len() == 1 && state.add_more_contacts_button_visible
    })
    .await;
    assert_eq!(ready.contacts[0].first_name, "Adam");

    controller.handle(favorites::Action::AddFavoritesClick);
    let open = controller.state();
    assert!(open.show_add_favorites_dialog);
    assert!(!open.save_favorites_button_enabled);
    assert_eq!(open.add_favorite_contacts.len(), 2);

    controller.handle(favorites::Action::AddToFavoriteCheckedChange(3));
    assert!(controller.state().save_favorites_button_enabled);

    controller.handle(favorites::Action::SaveFavoritesClick);
    let closed = controller.state();
    assert!(!closed.show_add_favorites_dialog);
    assert!(closed.add_favorite_contacts.is_empty());

    let promoted = wait_for(&mut states, |state| state.contacts.len() == 2).await;
    let names: Vec<_> = promoted
        .contacts
        .iter()
        .map(|contact| contact.full_name())
        .collect();
    assert_eq!(names, vec!["Adam Novak", "Eva Mala"]);
    assert!(promoted.add_more_contacts_button_visible);
}

#[tokio::test]
async fn favorites_detail_navigation_is_one_shot() {
    let store = seeded_store(&[]).await;
    let controller = FavoritesScreen.into_controller(&store);

    controller.handle(favorites::Action::ShowContactDetail(8));
    let event = timeout(WAIT, controller.events().recv()).await.unwrap();
    assert_eq!(event, favorites::Event::ShowContactDetail(8));
    assert_eq!(controller.events().try_recv(), None);
}

#[tokio::test]
async fn dropped_controller_leaves_store_usable() {
    let store = seeded_store(&[Contact::new("Adam", "Novak", "1")]).await;
    let controller = ContactsScreen.into_controller(&store);
    let mut states = controller.subscribe();
    wait_for(&mut states, |state| !state.is_loading).await;
    drop(controller);

    store.delete(1).wait().await.unwrap();
    assert!(store.contacts_by_favorite(false).unwrap().is_empty());
}
