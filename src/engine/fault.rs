//! Unrecoverable faults raised by the engine.

use crate::core::StateId;
use serde::Serialize;
use thiserror::Error;

/// Fatal condition detected while resolving a transition.
///
/// Both variants mean the supplied tables do not make sense. The engine
/// never continues after one: it logs the fault, hands it to
/// [`StateMachine::on_fault`](crate::engine::StateMachine::on_fault) and
/// then panics with the fault as the panic payload, so a host that must
/// shut down gracefully can `catch_unwind` and downcast it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum Fault<S: StateId> {
    /// The event was declared `CANNOT_HAPPEN` in this state.
    #[error("Forbidden event in state {}. Aborting!", .state.name())]
    Forbidden { state: S },

    /// The destination is at or beyond `MAX_STATES`.
    #[error(
        "Unknown state {} requested from state {}. Aborting!",
        .destination.name(),
        .state.name()
    )]
    OutOfRange { state: S, destination: S },
}

impl<S: StateId> Fault<S> {
    /// State the machine was in when the fault was detected.
    pub fn state(&self) -> S {
        match self {
            Self::Forbidden { state } | Self::OutOfRange { state, .. } => *state,
        }
    }
}
