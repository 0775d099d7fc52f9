//! Screen controllers following the Action -> State -> Event pattern.
//!
//! # Responsibility
//! - Hold exactly one observable state snapshot per screen.
//! - Map actions to new snapshots, store commands and one-shot events
//!   through a pure `Reducer`.
//! - Join repository streams with local state (combine-latest).
//!
//! # Invariants
//! - State is only ever replaced whole, under the controller lock.
//! - `derive` runs after every action and every upstream emission.
//! - Store commands are submitted without waiting for them to land.
//! - Subscriptions stop when the controller is dropped.

pub mod add_or_edit;
pub mod contacts;
mod event;
pub mod favorites;

pub use event::EventConduit;

use crate::store::{Command, ContactsStore, LiveQuery};
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Side effect requested by a reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<E> {
    /// Fire-and-forget store write.
    Persist(Command),
    /// One-shot signal to the presentation layer.
    Emit(E),
}

/// Result of one reducer step: the next snapshot plus ordered effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub state: S,
    pub effects: Vec<Effect<E>>,
}

impl<S, E> Transition<S, E> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    pub fn persist(mut self, command: Command) -> Self {
        self.effects.push(Effect::Persist(command));
        self
    }

    pub fn emit(mut self, event: E) -> Self {
        self.effects.push(Effect::Emit(event));
        self
    }
}

/// Pure screen logic plugged into a [`Controller`].
pub trait Reducer: Send + Sync + 'static {
    /// Short screen name used in log lines.
    const NAME: &'static str;

    type State: Clone + PartialEq + Send + Sync + 'static;
    /// Latest values of the repository streams the screen joins with.
    type Sources: Default + Send + 'static;
    type Action;
    type Event: Send + 'static;

    /// Maps one action onto the current snapshot.
    fn reduce(
        &self,
        state: &Self::State,
        sources: &Self::Sources,
        action: Self::Action,
    ) -> Transition<Self::State, Self::Event>;

    /// Recomputes derived fields from local state and upstream values.
    fn derive(
        &self,
        state: Self::State,
        sources: &Self::Sources,
    ) -> Transition<Self::State, Self::Event>;
}

struct Inner<R: Reducer> {
    state: R::State,
    sources: R::Sources,
}

struct Shared<R: Reducer> {
    reducer: R,
    inner: Mutex<Inner<R>>,
    state_tx: watch::Sender<R::State>,
    events: EventConduit<R::Event>,
    store: ContactsStore,
}

impl<R: Reducer> Shared<R> {
    fn step(
        &self,
        update: impl FnOnce(&R, &R::State, &mut R::Sources) -> Transition<R::State, R::Event>,
    ) -> usize {
        let effects = {
            let mut guard = self.inner.lock();
            let Inner { state, sources } = &mut *guard;

            let reduced = update(&self.reducer, state, sources);
            let derived = self.reducer.derive(reduced.state, sources);

            *state = derived.state;
            let published = state.clone();
            self.state_tx.send_if_modified(|current| {
                if *current == published {
                    return false;
                }
                *current = published;
                true
            });

            let mut effects = reduced.effects;
            effects.extend(derived.effects);
            effects
        };

        let count = effects.len();
        self.apply(effects);
        count
    }

    fn apply(&self, effects: Vec<Effect<R::Event>>) {
        for effect in effects {
            match effect {
                Effect::Persist(command) => {
                    // Fire-and-forget: failures are logged by the writer.
                    let _ = self.store.submit(command);
                }
                Effect::Emit(event) => {
                    if self.events.emit(event).is_some() {
                        debug!(
                            "event=event_dropped module=controller screen={} reason=replaced",
                            R::NAME
                        );
                    }
                }
            }
        }
    }
}

/// Runtime hosting one screen's reducer.
///
/// Dropping the controller aborts every bound subscription.
pub struct Controller<R: Reducer> {
    shared: Arc<Shared<R>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<R: Reducer> Controller<R> {
    /// Creates a controller whose first snapshot is `derive(initial)`.
    pub fn new(reducer: R, initial: R::State, store: ContactsStore) -> Self {
        let sources = R::Sources::default();
        let first = reducer.derive(initial, &sources);
        let (state_tx, _) = watch::channel(first.state.clone());
        let shared = Arc::new(Shared {
            reducer,
            inner: Mutex::new(Inner {
                state: first.state,
                sources,
            }),
            state_tx,
            events: EventConduit::new(),
            store,
        });

        shared.apply(first.effects);

        Self {
            shared,
            tasks: Vec::new(),
        }
    }

    /// Single entry point for user intents.
    pub fn handle(&self, action: R::Action) {
        let effects = self
            .shared
            .step(|reducer, state, sources| reducer.reduce(state, sources, action));
        debug!(
            "event=action module=controller screen={} effects={}",
            R::NAME,
            effects
        );
    }

    /// Current snapshot.
    pub fn state(&self) -> R::State {
        self.shared.state_tx.borrow().clone()
    }

    /// Observable stream of snapshots for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.shared.state_tx.subscribe()
    }

    /// One-shot event conduit.
    pub fn events(&self) -> &EventConduit<R::Event> {
        &self.shared.events
    }

    /// Joins a repository stream into this controller's sources.
    ///
    /// Every emission is folded into `Sources` and followed by `derive`.
    /// A read error ends the subscription.
    ///
    /// # Panics
    /// - When called outside a Tokio runtime.
    pub fn bind<T>(
        &mut self,
        source: &'static str,
        mut query: LiveQuery<T>,
        fold: impl Fn(&mut R::Sources, T) + Send + 'static,
    ) where
        T: Clone + PartialEq + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            while let Some(result) = query.next().await {
                match result {
                    Ok(value) => {
                        shared.step(|_, state, sources| {
                            fold(sources, value);
                            Transition::new(state.clone())
                        });
                    }
                    Err(err) => {
                        error!(
                            "event=subscription module=controller status=error screen={} source={} error={}",
                            R::NAME,
                            source,
                            err
                        );
                        return;
                    }
                }
            }
        });
        self.tasks.push(task);
    }
}

impl<R: Reducer> Drop for Controller<R> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
