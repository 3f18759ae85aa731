//! Per-state reactions.

use super::action::Action;

/// Actions attached to one real state.
///
/// All three handlers are optional; a missing handler is a no-op.
///
/// - `entering` runs once when the state is transitioned into
/// - `leaving` runs once when the state is transitioned out of
/// - `onevent` reacts to an event without entry/exit semantics
pub struct StateRecord<H> {
    pub entering: Option<Action<H>>,
    pub leaving: Option<Action<H>>,
    pub onevent: Option<Action<H>>,
}

impl<H> StateRecord<H> {
    /// A record with no handlers.
    pub fn new() -> Self {
        Self {
            entering: None,
            leaving: None,
            onevent: None,
        }
    }

    /// Set the entering handler.
    pub fn entering<F>(mut self, reaction: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.entering = Some(Action::new(reaction));
        self
    }

    /// Set the leaving handler.
    pub fn leaving<F>(mut self, reaction: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.leaving = Some(Action::new(reaction));
        self
    }

    /// Set the on-event handler.
    ///
    /// While a state has an on-event handler, events leaving it skip both
    /// its leaving handler and the destination's entering handler.
    pub fn on_event<F>(mut self, reaction: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.onevent = Some(Action::new(reaction));
        self
    }

    /// Check if no handler is configured.
    pub fn is_empty(&self) -> bool {
        self.entering.is_none() && self.leaving.is_none() && self.onevent.is_none()
    }
}

impl<H> Default for StateRecord<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for StateRecord<H> {
    fn clone(&self) -> Self {
        Self {
            entering: self.entering.clone(),
            leaving: self.leaving.clone(),
            onevent: self.onevent.clone(),
        }
    }
}

impl<H> std::fmt::Debug for StateRecord<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRecord")
            .field("entering", &self.entering.is_some())
            .field("leaving", &self.leaving.is_some())
            .field("onevent", &self.onevent.is_some())
            .finish()
    }
}
