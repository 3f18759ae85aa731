//! Transition records.

use crate::core::{Action, Guard, StateId};
use std::fmt;

/// A transition from the current state towards `destination`.
///
/// The destination defaults to `IGNORING_EVENT`. The guard, when present,
/// must return `true` for the transition to commit. The action runs after
/// the guard and before any leaving, entering or on-event handler.
pub struct Transition<S, H> {
    pub destination: S,
    pub guard: Option<Guard<H>>,
    pub action: Option<Action<H>>,
}

impl<S: StateId, H> Transition<S, H> {
    /// Transition to the given destination, with no guard and no action.
    pub fn to(destination: S) -> Self {
        Self {
            destination,
            guard: None,
            action: None,
        }
    }

    /// Explicitly ignore the event.
    pub fn ignore() -> Self {
        Self::to(S::IGNORING_EVENT)
    }

    /// Trap the event: reaching it at run time is fatal.
    pub fn forbid() -> Self {
        Self::to(S::CANNOT_HAPPEN)
    }

    /// Add a guard using a function or closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&mut H) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a pre-built guard.
    pub fn guard(mut self, guard: Guard<H>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Set the transition action.
    pub fn action<F>(mut self, reaction: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.action = Some(Action::new(reaction));
        self
    }
}

impl<S: StateId, H> Default for Transition<S, H> {
    fn default() -> Self {
        Self::ignore()
    }
}

impl<S: Clone, H> Clone for Transition<S, H> {
    fn clone(&self) -> Self {
        Self {
            destination: self.destination.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

impl<S: fmt::Debug, H> fmt::Debug for Transition<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("destination", &self.destination)
            .field("guard", &self.guard.is_some())
            .field("action", &self.action.is_some())
            .finish()
    }
}
