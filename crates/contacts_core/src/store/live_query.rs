//! Lazy, restartable read streams.
//!
//! # Invariants
//! - Nothing is queried until `next` is polled.
//! - The first `next` emits the current value; later calls wait for a table
//!   change first.
//! - A `distinct` query skips emissions equal to the previous one.

use super::StoreShared;
use crate::repo::contact_repo::{RepoResult, SqliteContactRepository};
use std::sync::Arc;
use tokio::sync::watch;

type Fetch<T> = dyn Fn(&SqliteContactRepository<'_>) -> RepoResult<T> + Send + Sync;

/// Push-based query over the contacts table.
pub struct LiveQuery<T> {
    shared: Arc<StoreShared>,
    changes: watch::Receiver<u64>,
    fetch: Arc<Fetch<T>>,
    distinct: bool,
    primed: bool,
    last: Option<T>,
}

impl<T> LiveQuery<T>
where
    T: Clone + PartialEq,
{
    pub(super) fn new(
        shared: Arc<StoreShared>,
        distinct: bool,
        fetch: impl Fn(&SqliteContactRepository<'_>) -> RepoResult<T> + Send + Sync + 'static,
    ) -> Self {
        let changes = shared.changes.subscribe();
        Self {
            shared,
            changes,
            fetch: Arc::new(fetch),
            distinct,
            primed: false,
            last: None,
        }
    }

    /// Returns the next value of the query.
    ///
    /// Yields `None` only when the store has shut down. A read failure is
    /// returned as `Some(Err(..))`; callers usually stop consuming then.
    pub async fn next(&mut self) -> Option<RepoResult<T>> {
        loop {
            if self.primed {
                self.changes.changed().await.ok()?;
            } else {
                let _ = self.changes.borrow_and_update();
                self.primed = true;
            }

            let value = match self.shared.read(|repo| (self.fetch)(repo)) {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            };

            if self.distinct && self.last.as_ref() == Some(&value) {
                continue;
            }
            if self.distinct {
                self.last = Some(value.clone());
            }
            return Some(Ok(value));
        }
    }

    /// Starts an independent copy of this query from scratch.
    ///
    /// The copy emits the current value on its first `next`.
    pub fn restart(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            changes: self.shared.changes.subscribe(),
            fetch: Arc::clone(&self.fetch),
            distinct: self.distinct,
            primed: false,
            last: None,
        }
    }
}
