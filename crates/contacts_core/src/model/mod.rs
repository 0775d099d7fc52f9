//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted in the `contacts` table.
//! - Keep derived attributes (full name) computed, never stored.
//!
//! # Invariants
//! - Every persisted contact is identified by a store-assigned `ContactId`.
//! - `INVALID_CONTACT_ID` is never assigned to a real row.

pub mod contact;
