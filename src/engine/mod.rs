//! The transition engine.
//!
//! # Key Concepts
//!
//! - **Engine**: current/initial state plus the transient fields of an
//!   in-progress evaluation
//! - **StateMachine**: host trait that runs the transition loop against the
//!   host's own guards and actions
//! - **Fault**: unrecoverable table defect, raised as a typed panic payload
//!
//! Transitions requested from inside a guard or action are never processed
//! recursively. They land in a single pending slot that the outer loop
//! drains once the current transition has settled, so chains of internal
//! transitions run in constant stack depth.

mod fault;
mod machine;

pub use fault::Fault;
pub use machine::{Engine, StateMachine};
