//! Core domain logic for the contacts manager.
//! This crate owns persistence, the reactive store and every screen
//! controller; front ends only render state and forward actions.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use controller::add_or_edit::{AddOrEditController, AddOrEditScreen, Mode};
pub use controller::contacts::{ContactsController, ContactsScreen};
pub use controller::favorites::{AddFavoriteContact, FavoritesController, FavoritesScreen};
pub use controller::{Controller, Effect, EventConduit, Reducer, Transition};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact::{Contact, ContactId, ContactValidationError, INVALID_CONTACT_ID};
pub use repo::contact_repo::{
    ContactRepository, RepoError, RepoResult, SqliteContactRepository,
};
pub use store::{Command, ContactsStore, LiveQuery, PendingWrite};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
