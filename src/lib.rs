//! Statechart Engine: a transition engine for small, flat state machines
//!
//! The engine implements a restricted subset of UML statecharts: flat states
//! with entering/leaving/on-event actions, guarded transitions with
//! transition actions, and internal transitions requested from inside those
//! actions. Hierarchical states, history and concurrent regions are not
//! supported.
//!
//! # Core Concepts
//!
//! - **State identifiers**: small enums implementing `StateId`, with three
//!   reserved sentinels (see `state_enum!`)
//! - **Tables**: a dense `StateTable` of per-state reactions and one sparse
//!   `TransitionTable` per external event, both sealed at construction
//! - **Engine**: resolves an event to a destination and sequences guard,
//!   action, leaving and entering handlers without recursion
//! - **SharedMachine**: optional lock for hosts driven from several threads
//!
//! # Example
//!
//! ```rust
//! use statechart_engine::builder::{StateTable, Transition, TransitionTable};
//! use statechart_engine::core::StateRecord;
//! use statechart_engine::engine::{Engine, StateMachine};
//! use statechart_engine::state_enum;
//!
//! state_enum! {
//!     pub enum MotorState {
//!         Idle,
//!         Stopping,
//!         Starting,
//!         Spinning,
//!     }
//! }
//!
//! struct Motor {
//!     engine: Engine<MotorState, Motor>,
//!     set_speed: TransitionTable<MotorState, Motor>,
//!     speed: u32,
//! }
//!
//! impl StateMachine for Motor {
//!     type State = MotorState;
//!
//!     fn engine(&self) -> &Engine<MotorState, Self> {
//!         &self.engine
//!     }
//!
//!     fn engine_mut(&mut self) -> &mut Engine<MotorState, Self> {
//!         &mut self.engine
//!     }
//! }
//!
//! impl Motor {
//!     fn set_speed(&mut self, speed: u32) {
//!         self.speed = speed;
//!         self.react(|m| &m.set_speed);
//!     }
//! }
//!
//! let states = StateTable::builder()
//!     .state(
//!         MotorState::Starting,
//!         StateRecord::new().entering(|m: &mut Motor| m.speed = m.speed.min(10)),
//!     )
//!     .build()
//!     .unwrap();
//! let set_speed = TransitionTable::builder("set speed")
//!     .on(MotorState::Idle, Transition::to(MotorState::Starting))
//!     .on(MotorState::Starting, Transition::to(MotorState::Spinning))
//!     .build()
//!     .unwrap();
//!
//! let mut motor = Motor {
//!     engine: Engine::new(MotorState::Idle, states).unwrap(),
//!     set_speed,
//!     speed: 0,
//! };
//!
//! motor.set_speed(50);
//! assert_eq!(motor.current_state(), MotorState::Starting);
//! assert_eq!(motor.speed, 10);
//! ```

extern crate self as statechart_engine;

pub mod builder;
pub mod core;
pub mod engine;
pub mod shared;

// Re-export commonly used types
pub use builder::{BuildError, StateTable, Transition, TransitionTable};
pub use core::{Action, Guard, StateId, StateRecord};
pub use engine::{Engine, Fault, StateMachine};
pub use shared::SharedMachine;

// Used by `state_enum!` so hosts need no direct serde dependency.
#[doc(hidden)]
pub use serde;
