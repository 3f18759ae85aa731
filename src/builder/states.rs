//! Dense table of per-state reactions.

use crate::builder::error::BuildError;
use crate::core::{StateId, StateRecord};
use std::marker::PhantomData;

/// Immutable mapping from state identifier to its reactions.
///
/// One slot exists per index below `MAX_STATES`; sentinel slots are always
/// empty. The table can only be produced by [`StateTableBuilder::build`]
/// and offers no mutation afterwards.
pub struct StateTable<S, H> {
    records: Box<[StateRecord<H>]>,
    _phantom: PhantomData<S>,
}

impl<S: StateId, H> StateTable<S, H> {
    /// Start building a table.
    pub fn builder() -> StateTableBuilder<S, H> {
        StateTableBuilder::new()
    }

    /// A table where no state has any reaction.
    pub fn empty() -> Self {
        Self {
            records: empty_records::<S, H>().into_boxed_slice(),
            _phantom: PhantomData,
        }
    }

    /// Reactions of a real state, `None` for sentinels.
    pub fn get(&self, state: S) -> Option<&StateRecord<H>> {
        if state.is_real() {
            self.records.get(state.index())
        } else {
            None
        }
    }

    /// Number of slots (the index of `MAX_STATES`).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<S, H> std::fmt::Debug for StateTable<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.records.iter()).finish()
    }
}

fn empty_records<S: StateId, H>() -> Vec<StateRecord<H>> {
    (0..S::MAX_STATES.index()).map(|_| StateRecord::new()).collect()
}

/// Builder for sealing a [`StateTable`].
pub struct StateTableBuilder<S, H> {
    records: Vec<(S, StateRecord<H>)>,
}

impl<S: StateId, H> StateTableBuilder<S, H> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Attach reactions to a state.
    pub fn state(mut self, state: S, record: StateRecord<H>) -> Self {
        self.records.push((state, record));
        self
    }

    /// Seal the table.
    /// Returns an error if a sentinel is configured or a state appears twice.
    pub fn build(self) -> Result<StateTable<S, H>, BuildError> {
        let mut records = empty_records::<S, H>();
        let mut configured = vec![false; records.len()];

        for (state, record) in self.records {
            if !state.is_real() {
                return Err(BuildError::SentinelState {
                    state: state.name(),
                });
            }
            let index = state.index();
            if configured[index] {
                return Err(BuildError::DuplicateState {
                    state: state.name(),
                });
            }
            configured[index] = true;
            records[index] = record;
        }

        Ok(StateTable {
            records: records.into_boxed_slice(),
            _phantom: PhantomData,
        })
    }
}

impl<S: StateId, H> Default for StateTableBuilder<S, H> {
    fn default() -> Self {
        Self::new()
    }
}
