//! Contact record and validation rules.
//!
//! # Responsibility
//! - Define the single persisted entity of the contacts store.
//! - Validate records before they reach SQL.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, then never changes.
//! - `full_name()` is derived from first and last name on every call.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier.
pub type ContactId = i64;

/// Navigation sentinel meaning "create a new contact".
///
/// SQLite `AUTOINCREMENT` keys start at 1, so this never collides with a
/// persisted row.
pub const INVALID_CONTACT_ID: ContactId = -1;

/// Validation failures for contact writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// Identifier present but not a valid store key.
    InvalidId(ContactId),
    /// First name, last name and phone number are all blank.
    Empty,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "contact id must be positive, got {id}"),
            Self::Empty => write!(f, "contact must have a name or phone number"),
        }
    }
}

impl Error for ContactValidationError {}

/// One entry of the address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// `None` for records that have not been saved yet.
    pub id: Option<ContactId>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_favorite: bool,
}

impl Contact {
    /// Creates an unsaved, non-favorite contact.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
            is_favorite: false,
        }
    }

    /// Display name shown in lists and dialogs.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks the record against write-side invariants.
    ///
    /// # Errors
    /// - `InvalidId` when `id` is present but not positive.
    /// - `Empty` when every text field is blank.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(ContactValidationError::InvalidId(id));
            }
        }

        if self.first_name.trim().is_empty()
            && self.last_name.trim().is_empty()
            && self.phone_number.trim().is_empty()
        {
            return Err(ContactValidationError::Empty);
        }

        Ok(())
    }
}
