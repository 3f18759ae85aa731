//! Motor Controller
//!
//! This example drives a small motor controller through the engine.
//!
//! Key concepts:
//! - Guarded transitions with transition actions
//! - Entering/leaving reactions per state
//! - Internal transitions requested from an entering action
//! - Intercepting a forbidden event with `on_fault`
//! - Sharing the machine between threads
//!
//! Run with: RUST_LOG=debug cargo run --example motor

use statechart_engine::builder::{StateTable, Transition, TransitionTable};
use statechart_engine::core::{StateId, StateRecord};
use statechart_engine::engine::{Engine, Fault, StateMachine};
use statechart_engine::shared::SharedMachine;
use statechart_engine::state_enum;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum MotorState {
        Idle,
        Stopping,
        Starting,
        Spinning,
    }
}

const MAX_SPEED: u32 = 3000;

struct Motor {
    engine: Engine<MotorState, Motor>,
    set_speed: TransitionTable<MotorState, Motor>,
    halt: TransitionTable<MotorState, Motor>,
    calibrate: TransitionTable<MotorState, Motor>,
    requested: u32,
    speed: u32,
}

impl StateMachine for Motor {
    type State = MotorState;

    fn engine(&self) -> &Engine<MotorState, Self> {
        &self.engine
    }

    fn engine_mut(&mut self) -> &mut Engine<MotorState, Self> {
        &mut self.engine
    }

    fn on_fault(&mut self, fault: &Fault<MotorState>) {
        println!("  !! {fault}, cutting power");
        self.speed = 0;
    }
}

impl Motor {
    fn new() -> Self {
        let states = StateTable::builder()
            .state(
                MotorState::Starting,
                StateRecord::new().entering(|_: &mut Motor| println!("  spinning up")),
            )
            .state(
                MotorState::Spinning,
                StateRecord::new()
                    .entering(|m: &mut Motor| println!("  at speed {}", m.speed))
                    .leaving(|_: &mut Motor| println!("  leaving full speed")),
            )
            .state(
                MotorState::Stopping,
                StateRecord::new().entering(|m: &mut Motor| {
                    println!("  braking");
                    m.speed = 0;
                    // Braking completes on its own.
                    m.request_transition(MotorState::Idle, None);
                }),
            )
            .build()
            .unwrap();

        let set_speed = TransitionTable::builder("set speed")
            .on(
                MotorState::Idle,
                Transition::to(MotorState::Starting)
                    .when(|m: &mut Motor| m.requested <= MAX_SPEED)
                    .action(|m: &mut Motor| m.speed = m.requested),
            )
            .on(MotorState::Starting, Transition::to(MotorState::Spinning))
            .on(
                MotorState::Spinning,
                Transition::to(MotorState::Spinning)
                    .when(|m: &mut Motor| m.requested <= MAX_SPEED)
                    .action(|m: &mut Motor| m.speed = m.requested),
            )
            .build()
            .unwrap();

        let halt = TransitionTable::builder("halt")
            .on(MotorState::Starting, Transition::to(MotorState::Stopping))
            .on(MotorState::Spinning, Transition::to(MotorState::Stopping))
            .build()
            .unwrap();

        let calibrate = TransitionTable::builder("calibrate")
            .on(MotorState::Idle, Transition::ignore())
            .on(MotorState::Spinning, Transition::forbid())
            .build()
            .unwrap();

        Motor {
            engine: Engine::new(MotorState::Idle, states).unwrap(),
            set_speed,
            halt,
            calibrate,
            requested: 0,
            speed: 0,
        }
    }

    fn set_speed(&mut self, speed: u32) {
        println!("set speed {speed} in {}", self.state_name());
        self.requested = speed;
        self.react(|m| &m.set_speed);
    }

    fn halt(&mut self) {
        println!("halt in {}", self.state_name());
        self.react(|m| &m.halt);
    }

    fn calibrate(&mut self) {
        println!("calibrate in {}", self.state_name());
        self.react(|m| &m.calibrate);
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Motor Controller Example ===\n");

    let mut motor = Motor::new();
    println!("Initial state: {}", motor.state_name());

    motor.set_speed(1200);
    motor.set_speed(1500);
    motor.set_speed(9000);
    println!("State: {}, speed {}\n", motor.state_name(), motor.speed);

    motor.set_speed(1800);
    println!("State: {}, speed {}\n", motor.state_name(), motor.speed);

    motor.halt();
    println!("State after halt: {}\n", motor.state_name());

    motor.calibrate();
    motor.set_speed(500);
    motor.set_speed(500);
    let fault = catch_unwind(AssertUnwindSafe(|| motor.calibrate()));
    if let Err(payload) = fault {
        if let Some(fault) = payload.downcast_ref::<Fault<MotorState>>() {
            println!("Fault intercepted in state {}", fault.state().name());
        }
    }
    motor.reset();
    println!("State after reset: {}\n", motor.state_name());

    println!("--- Shared between threads ---");
    let shared = SharedMachine::new(motor);
    let workers: Vec<_> = [800, 1600]
        .into_iter()
        .map(|speed| {
            let shared = shared.clone();
            thread::spawn(move || {
                shared.dispatch(|m| m.set_speed(speed));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    println!("Shared state: {:?}", shared.current_state());

    println!("\n=== Example Complete ===");
}
