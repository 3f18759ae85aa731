//! Sealed tables that describe a concrete machine.
//!
//! Tables are assembled with fluent builders and validated once in
//! `build()`. After that they are immutable for the lifetime of the engine.

pub mod error;
pub mod macros;
pub mod states;
pub mod table;
pub mod transition;

pub use error::BuildError;
pub use states::{StateTable, StateTableBuilder};
pub use table::{TransitionTable, TransitionTableBuilder};
pub use transition::Transition;
