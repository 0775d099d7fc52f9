//! Reactive contacts store.
//!
//! # Responsibility
//! - Expose live, restartable read streams over the `contacts` table.
//! - Accept fire-and-forget write commands and apply them off the caller's
//!   context on a single background writer.
//!
//! # Invariants
//! - Writes are applied one at a time, in submission order.
//! - Every write that changed at least one row wakes every live query.
//! - A caller never blocks on a write; the result is only observable through
//!   `PendingWrite::wait`, otherwise a failure is logged and dropped.

mod live_query;
mod writer;

pub use live_query::LiveQuery;
pub use writer::PendingWrite;

use crate::db::{open_db, open_db_in_memory};
use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{
    ContactRepository, RepoError, RepoResult, SqliteContactRepository,
};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// One write request accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert (no id) or upsert by id, replacing all fields.
    Save(Contact),
    /// Raise the favorite flag on every listed id.
    SetFavorites(Vec<ContactId>),
    /// Remove one row; absent rows are a no-op.
    Delete(ContactId),
}

impl Command {
    fn op_name(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::SetFavorites(_) => "set_favorites",
            Self::Delete(_) => "delete",
        }
    }
}

pub(crate) struct StoreShared {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
}

impl StoreShared {
    pub(crate) fn read<T>(
        &self,
        query: impl FnOnce(&SqliteContactRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.conn.lock();
        query(&SqliteContactRepository::new(&conn))
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

/// Cloneable handle to the reactive contacts store.
///
/// All clones share one connection and one writer. The writer thread exits
/// once the last handle is dropped and its queue drains.
#[derive(Clone)]
pub struct ContactsStore {
    shared: Arc<StoreShared>,
    commands: mpsc::UnboundedSender<writer::WriteRequest>,
}

impl ContactsStore {
    /// Wraps an already migrated connection and starts the writer thread.
    ///
    /// # Errors
    /// - `WriterSpawn` when the OS refuses to start the writer thread.
    pub fn new(conn: Connection) -> RepoResult<Self> {
        let (changes, _) = watch::channel(0);
        let shared = Arc::new(StoreShared {
            conn: Mutex::new(conn),
            changes,
        });
        let commands = writer::spawn_writer(Arc::clone(&shared))?;
        Ok(Self { shared, commands })
    }

    /// Opens (and migrates) a database file, then starts the store.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::new(open_db(path)?)
    }

    /// Opens a private in-memory database, then starts the store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::new(open_db_in_memory()?)
    }

    /// Live list of every contact, re-emitted on each table change.
    pub fn observe_all(&self) -> LiveQuery<Vec<Contact>> {
        LiveQuery::new(Arc::clone(&self.shared), false, |repo| repo.list_contacts())
    }

    /// Live list of contacts whose favorite flag equals `is_favorite`.
    pub fn observe_by_favorite(&self, is_favorite: bool) -> LiveQuery<Vec<Contact>> {
        LiveQuery::new(Arc::clone(&self.shared), false, move |repo| {
            repo.list_contacts_by_favorite(is_favorite)
        })
    }

    /// Live view of one row; emits again only when that row's value changes.
    pub fn observe_one(&self, id: ContactId) -> LiveQuery<Option<Contact>> {
        LiveQuery::new(Arc::clone(&self.shared), true, move |repo| {
            repo.get_contact(id)
        })
    }

    /// One-shot snapshot of contacts filtered by favorite flag.
    pub fn contacts_by_favorite(&self, is_favorite: bool) -> RepoResult<Vec<Contact>> {
        self.shared
            .read(|repo| repo.list_contacts_by_favorite(is_favorite))
    }

    /// Saves a contact: insert when it has no id, upsert by id otherwise.
    pub fn save(&self, contact: Contact) -> PendingWrite {
        self.submit(Command::Save(contact))
    }

    /// Marks every listed id favorite. Ids not listed are left untouched.
    pub fn set_favorites(&self, ids: Vec<ContactId>) -> PendingWrite {
        self.submit(Command::SetFavorites(ids))
    }

    /// Deletes one contact by id.
    pub fn delete(&self, id: ContactId) -> PendingWrite {
        self.submit(Command::Delete(id))
    }

    /// Enqueues a write without waiting for it to land.
    pub fn submit(&self, command: Command) -> PendingWrite {
        writer::enqueue(&self.commands, Some(command))
    }

    /// Resolves once every command submitted before this call was applied.
    pub fn flush(&self) -> PendingWrite {
        writer::enqueue(&self.commands, None)
    }
}

pub(crate) fn apply_command(
    repo: &SqliteContactRepository<'_>,
    command: &Command,
) -> Result<bool, RepoError> {
    match command {
        Command::Save(contact) => repo.upsert_contact(contact).map(|_| true),
        Command::SetFavorites(ids) => repo.set_favorites(ids).map(|changed| changed > 0),
        Command::Delete(id) => repo.delete_contact(*id),
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, ContactsStore};
    use crate::model::contact::Contact;

    #[tokio::test]
    async fn flush_waits_for_earlier_writes() {
        let store = ContactsStore::open_in_memory().unwrap();
        let _ = store.save(Contact::new("Adam", "Novak", "1"));
        let _ = store.save(Contact::new("Peter", "Kral", "2"));
        store.flush().wait().await.unwrap();

        let contacts = store.contacts_by_favorite(false).unwrap();
        assert_eq!(contacts.len(), 2);
    }

    #[tokio::test]
    async fn invalid_save_reports_error_to_waiting_caller() {
        let store = ContactsStore::open_in_memory().unwrap();
        let err = store
            .submit(Command::Save(Contact::new("", "", "")))
            .wait()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("name or phone"));
    }

    #[test]
    fn command_names_are_stable_log_keys() {
        assert_eq!(Command::Delete(1).op_name(), "delete");
        assert_eq!(Command::SetFavorites(vec![]).op_name(), "set_favorites");
    }
}
