//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/select/delete APIs over canonical `contacts` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Contact::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `set_favorites` only ever promotes; it never clears a favorite flag.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    phone_number,
    is_favorite
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    InvalidData(String),
    /// Background writer thread could not be started.
    WriterSpawn(std::io::Error),
    /// Background writer is gone; the command was never applied.
    WriterStopped,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::WriterSpawn(err) => write!(f, "failed to start contact writer: {err}"),
            Self::WriterStopped => write!(f, "contact writer is not running"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::WriterSpawn(err) => Some(err),
            Self::InvalidData(_) | Self::WriterStopped => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact rows.
pub trait ContactRepository {
    /// Inserts when `contact.id` is `None`, otherwise replaces the row with
    /// that id (inserting it if missing). Returns the row id.
    fn upsert_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    fn list_contacts_by_favorite(&self, is_favorite: bool) -> RepoResult<Vec<Contact>>;
    /// Returns `false` when no row had that id.
    fn delete_contact(&self, id: ContactId) -> RepoResult<bool>;
    /// Returns the number of rows whose flag was raised.
    fn set_favorites(&self, ids: &[ContactId]) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_list(&self, sql: &str, favorite: Option<bool>) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match favorite {
            Some(flag) => stmt.query([bool_to_int(flag)])?,
            None => stmt.query([])?,
        };

        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn upsert_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        match contact.id {
            None => {
                self.conn.execute(
                    "INSERT INTO contacts (
                        first_name,
                        last_name,
                        phone_number,
                        is_favorite
                    ) VALUES (?1, ?2, ?3, ?4);",
                    params![
                        contact.first_name.as_str(),
                        contact.last_name.as_str(),
                        contact.phone_number.as_str(),
                        bool_to_int(contact.is_favorite),
                    ],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO contacts (
                        id,
                        first_name,
                        last_name,
                        phone_number,
                        is_favorite
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(id) DO UPDATE SET
                        first_name = excluded.first_name,
                        last_name = excluded.last_name,
                        phone_number = excluded.phone_number,
                        is_favorite = excluded.is_favorite;",
                    params![
                        id,
                        contact.first_name.as_str(),
                        contact.last_name.as_str(),
                        contact.phone_number.as_str(),
                        bool_to_int(contact.is_favorite),
                    ],
                )?;
                Ok(id)
            }
        }
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let contact = stmt
            .query_row([id], |row| Ok(parse_contact_row(row)))
            .optional()?;
        contact.transpose()
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        self.query_list(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"), None)
    }

    fn list_contacts_by_favorite(&self, is_favorite: bool) -> RepoResult<Vec<Contact>> {
        self.query_list(
            &format!("{CONTACT_SELECT_SQL} WHERE is_favorite = ?1 ORDER BY id ASC;"),
            Some(is_favorite),
        )
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn set_favorites(&self, ids: &[ContactId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let changed = self.conn.execute(
            &format!(
                "UPDATE contacts
                 SET is_favorite = 1
                 WHERE is_favorite = 0 AND id IN ({placeholders});"
            ),
            params_from_iter(ids.iter()),
        )?;
        Ok(changed)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid id value `{id}` in contacts.id"
        )));
    }

    let is_favorite = match row.get::<_, i64>("is_favorite")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_favorite value `{other}` in contacts.is_favorite"
            )));
        }
    };

    Ok(Contact {
        id: Some(id),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        phone_number: row.get("phone_number")?,
        is_favorite,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
