//! Build errors for state tables, transition tables and engines.

use thiserror::Error;

/// Errors that can occur when sealing tables or constructing an engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state {state} is not a real state")]
    InvalidInitialState { state: &'static str },

    #[error("Sentinel {state} cannot carry state actions")]
    SentinelState { state: &'static str },

    #[error("State {state} is configured more than once")]
    DuplicateState { state: &'static str },

    #[error("Event '{event}': sentinel {state} cannot be a transition source")]
    SentinelSource {
        event: &'static str,
        state: &'static str,
    },

    #[error("Event '{event}': state {state} has more than one transition")]
    DuplicateTransition {
        event: &'static str,
        state: &'static str,
    },

    #[error("Event '{event}': destination {destination} from {from} is outside the state range")]
    InvalidDestination {
        event: &'static str,
        from: &'static str,
        destination: &'static str,
    },
}
