//! Per-event sparse transition tables.

use crate::builder::error::BuildError;
use crate::builder::transition::Transition;
use crate::core::StateId;
use std::collections::BTreeMap;
use std::fmt;

/// Sparse mapping from source state to [`Transition`] for one external event.
///
/// A source state with no entry ignores the event. Tables are sealed by
/// [`TransitionTableBuilder::build`] and immutable afterwards.
///
/// # Example
///
/// ```rust
/// use statechart_engine::builder::{Transition, TransitionTable};
/// use statechart_engine::core::StateId;
/// use statechart_engine::state_enum;
///
/// state_enum! {
///     enum Motor {
///         Idle,
///         Starting,
///         Spinning,
///     }
/// }
///
/// let set_speed = TransitionTable::<Motor, ()>::builder("set speed")
///     .on(Motor::Idle, Transition::to(Motor::Starting))
///     .on(Motor::Starting, Transition::to(Motor::Spinning))
///     .build()
///     .unwrap();
///
/// assert_eq!(set_speed.resolve(Motor::Idle), Motor::Starting);
/// assert_eq!(set_speed.resolve(Motor::Spinning), Motor::IGNORING_EVENT);
/// ```
pub struct TransitionTable<S, H> {
    event: &'static str,
    entries: BTreeMap<S, Transition<S, H>>,
}

impl<S: StateId, H> TransitionTable<S, H> {
    /// Start building the table of the named event.
    pub fn builder(event: &'static str) -> TransitionTableBuilder<S, H> {
        TransitionTableBuilder::new(event)
    }

    /// Name of the event this table answers to.
    pub fn event(&self) -> &'static str {
        self.event
    }

    /// Transition configured for the source state, if any.
    pub fn lookup(&self, source: S) -> Option<&Transition<S, H>> {
        self.entries.get(&source)
    }

    /// Destination for the source state, `IGNORING_EVENT` if none.
    pub fn resolve(&self, source: S) -> S {
        self.lookup(source)
            .map_or(S::IGNORING_EVENT, |transition| transition.destination)
    }

    /// Iterate over `(source, transition)` pairs in state order.
    pub fn iter(&self) -> impl Iterator<Item = (S, &Transition<S, H>)> {
        self.entries.iter().map(|(source, tr)| (*source, tr))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: fmt::Debug, H> fmt::Debug for TransitionTable<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("event", &self.event)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Builder for sealing a [`TransitionTable`].
pub struct TransitionTableBuilder<S, H> {
    event: &'static str,
    entries: Vec<(S, Transition<S, H>)>,
}

impl<S: StateId, H> TransitionTableBuilder<S, H> {
    /// Create a builder for the named event.
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            entries: Vec::new(),
        }
    }

    /// React to the event while in `source`.
    pub fn on(mut self, source: S, transition: Transition<S, H>) -> Self {
        self.entries.push((source, transition));
        self
    }

    /// Seal the table.
    ///
    /// Rejects sentinel sources, a second entry for the same source, and
    /// destinations at or beyond `MAX_STATES`. `IGNORING_EVENT` and
    /// `CANNOT_HAPPEN` are valid destinations.
    pub fn build(self) -> Result<TransitionTable<S, H>, BuildError> {
        let event = self.event;
        let mut entries = BTreeMap::new();

        for (source, transition) in self.entries {
            if !source.is_real() {
                return Err(BuildError::SentinelSource {
                    event,
                    state: source.name(),
                });
            }
            if transition.destination.index() >= S::MAX_STATES.index() {
                return Err(BuildError::InvalidDestination {
                    event,
                    from: source.name(),
                    destination: transition.destination.name(),
                });
            }
            if entries.insert(source, transition).is_some() {
                return Err(BuildError::DuplicateTransition {
                    event,
                    state: source.name(),
                });
            }
        }

        Ok(TransitionTable { event, entries })
    }
}
