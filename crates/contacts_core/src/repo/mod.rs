//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow query/command contract over the `contacts` table.
//! - Isolate SQLite query details from the reactive store and controllers.
//!
//! # Invariants
//! - Repository writes must enforce `Contact::validate()` before persistence.
//! - Each operation is a single SQL statement; no cross-statement transaction.

pub mod contact_repo;
