//! Core vocabulary of the engine.
//!
//! This module contains the passive pieces the engine operates on:
//! - State identifiers via the `StateId` trait
//! - Guard predicates and actions bound to the host machine
//! - Per-state entering/leaving/on-event records

mod action;
mod guard;
mod record;
mod state;

pub use action::Action;
pub use guard::Guard;
pub use record::StateRecord;
pub use state::{real_states, StateId};
