use contacts_core::db::open_db_in_memory;
use contacts_core::{
    Contact, ContactRepository, ContactValidationError, RepoError, SqliteContactRepository,
};

#[test]
fn insert_assigns_fresh_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let first = repo
        .upsert_contact(&Contact::new("Adam", "Novak", "+421900"))
        .unwrap();
    let second = repo
        .upsert_contact(&Contact::new("Peter", "Kral", "+421901"))
        .unwrap();
    assert!(first > 0);
    assert_ne!(first, second);

    let loaded = repo.get_contact(first).unwrap().unwrap();
    assert_eq!(loaded.id, Some(first));
    assert_eq!(loaded.full_name(), "Adam Novak");
    assert!(!loaded.is_favorite);
}

#[test]
fn upsert_with_id_replaces_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let id = repo
        .upsert_contact(&Contact::new("Adam", "Novak", "+421900"))
        .unwrap();

    let updated = Contact {
        id: Some(id),
        first_name: "Adela".to_string(),
        last_name: "Nova".to_string(),
        phone_number: "+420111".to_string(),
        is_favorite: true,
    };
    assert_eq!(repo.upsert_contact(&updated).unwrap(), id);
    assert_eq!(repo.upsert_contact(&updated).unwrap(), id);

    assert_eq!(repo.get_contact(id).unwrap(), Some(updated));
    assert_eq!(repo.list_contacts().unwrap().len(), 1);
}

#[test]
fn upsert_with_unknown_id_inserts_that_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let contact = Contact {
        id: Some(42),
        ..Contact::new("Eva", "Mala", "1")
    };
    repo.upsert_contact(&contact).unwrap();
    assert_eq!(repo.get_contact(42).unwrap(), Some(contact));
}

#[test]
fn validation_failure_blocks_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let err = repo.upsert_contact(&Contact::new("", " ", "")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::Empty)
    ));
    assert!(repo.list_contacts().unwrap().is_empty());
}

#[test]
fn delete_removes_row_and_missing_id_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let id = repo
        .upsert_contact(&Contact::new("Adam", "Novak", "1"))
        .unwrap();

    assert!(repo.delete_contact(id).unwrap());
    assert_eq!(repo.get_contact(id).unwrap(), None);
    assert!(!repo.delete_contact(id).unwrap());
    assert!(!repo.delete_contact(9_999).unwrap());
}

#[test]
fn set_favorites_only_promotes_listed_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);
    let kept = repo
        .upsert_contact(&Contact {
            is_favorite: true,
            ..Contact::new("Kept", "Favorite", "1")
        })
        .unwrap();
    let promoted_a = repo.upsert_contact(&Contact::new("A", "A", "2")).unwrap();
    let promoted_b = repo.upsert_contact(&Contact::new("B", "B", "3")).unwrap();
    let untouched = repo.upsert_contact(&Contact::new("C", "C", "4")).unwrap();

    let changed = repo.set_favorites(&[promoted_a, promoted_b, kept]).unwrap();
    assert_eq!(changed, 2);

    let favorite_ids: Vec<_> = repo
        .list_contacts_by_favorite(true)
        .unwrap()
        .into_iter()
        .filter_map(|contact| contact.id)
        .collect();
    assert_eq!(favorite_ids, vec![kept, promoted_a, promoted_b]);

    let others = repo.list_contacts_by_favorite(false).unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].id, Some(untouched));

    assert_eq!(repo.set_favorites(&[]).unwrap(), 0);
}

#[test]
fn read_rejects_corrupt_favorite_flag() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO contacts (first_name, last_name, phone_number, is_favorite)
         VALUES ('A', 'B', '1', 7);",
    )
    .unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let err = repo.list_contacts().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("is_favorite")));
}
