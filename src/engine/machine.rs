//! Transition engine: event resolution and the non-recursive transition loop.

use crate::builder::{BuildError, StateTable, Transition, TransitionTable};
use crate::core::StateId;
use crate::engine::fault::Fault;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A transition waiting to be processed by the loop.
struct Request<S, H> {
    destination: S,
    transition: Option<Transition<S, H>>,
}

/// State of one running machine.
///
/// Holds the sealed state table, the current and initial states, and the
/// two transient fields used only while a transition is evaluated: the
/// pending request slot and the re-entrancy flag.
pub struct Engine<S, H> {
    states: Arc<StateTable<S, H>>,
    current: S,
    initial: S,
    pending: Option<Request<S, H>>,
    nesting: bool,
}

impl<S: StateId, H> Engine<S, H> {
    /// Create an engine in its initial state.
    /// Returns an error if `initial` is not a real state.
    pub fn new(initial: S, states: StateTable<S, H>) -> Result<Self, BuildError> {
        Self::with_shared_states(initial, Arc::new(states))
    }

    /// Create an engine over a state table shared with other instances.
    pub fn with_shared_states(
        initial: S,
        states: Arc<StateTable<S, H>>,
    ) -> Result<Self, BuildError> {
        if !initial.is_real() {
            return Err(BuildError::InvalidInitialState {
                state: initial.name(),
            });
        }

        Ok(Self {
            states,
            current: initial,
            initial,
            pending: None,
            nesting: false,
        })
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn initial_state(&self) -> S {
        self.initial
    }

    pub fn states(&self) -> &StateTable<S, H> {
        &self.states
    }

    /// Check if a transition is being evaluated right now.
    pub fn is_evaluating(&self) -> bool {
        self.nesting
    }

    /// Check if a deferred transition is waiting in the pending slot.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Restore the initial state and clear the transient fields.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.pending = None;
        self.nesting = false;
    }
}

impl<S: fmt::Debug, H> fmt::Debug for Engine<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("current", &self.current)
            .field("initial", &self.initial)
            .field("pending", &self.pending.as_ref().map(|r| &r.destination))
            .field("nesting", &self.nesting)
            .finish()
    }
}

/// Host side of a concrete machine.
///
/// The host owns an [`Engine`] and exposes its external events as methods
/// that call [`StateMachine::react`] with the event's transition table.
/// Guards and actions receive the host mutably and may call
/// [`StateMachine::request_transition`] themselves: such internal requests
/// are deferred and processed by the enclosing loop, one at a time.
///
/// # Example
///
/// ```rust
/// use statechart_engine::builder::{StateTable, Transition, TransitionTable};
/// use statechart_engine::core::StateRecord;
/// use statechart_engine::engine::{Engine, StateMachine};
/// use statechart_engine::state_enum;
///
/// state_enum! {
///     enum Lamp {
///         Off,
///         On,
///     }
/// }
///
/// struct Switch {
///     engine: Engine<Lamp, Switch>,
///     toggle: TransitionTable<Lamp, Switch>,
///     lit: u32,
/// }
///
/// impl StateMachine for Switch {
///     type State = Lamp;
///
///     fn engine(&self) -> &Engine<Lamp, Self> {
///         &self.engine
///     }
///
///     fn engine_mut(&mut self) -> &mut Engine<Lamp, Self> {
///         &mut self.engine
///     }
/// }
///
/// let states = StateTable::builder()
///     .state(Lamp::On, StateRecord::new().entering(|s: &mut Switch| s.lit += 1))
///     .build()
///     .unwrap();
/// let toggle = TransitionTable::builder("toggle")
///     .on(Lamp::Off, Transition::to(Lamp::On))
///     .on(Lamp::On, Transition::to(Lamp::Off))
///     .build()
///     .unwrap();
///
/// let mut switch = Switch {
///     engine: Engine::new(Lamp::Off, states).unwrap(),
///     toggle,
///     lit: 0,
/// };
///
/// switch.react(|s| &s.toggle);
/// assert_eq!(switch.current_state(), Lamp::On);
/// assert_eq!(switch.lit, 1);
/// ```
pub trait StateMachine: Sized {
    type State: StateId;

    fn engine(&self) -> &Engine<Self::State, Self>;

    fn engine_mut(&mut self) -> &mut Engine<Self::State, Self>;

    /// Called with a fatal fault right before the engine panics.
    ///
    /// The default does nothing. Override it to put the host in a safe
    /// condition before the fault unwinds. Transitions requested from the
    /// hook are discarded.
    fn on_fault(&mut self, _fault: &Fault<Self::State>) {}

    fn current_state(&self) -> Self::State {
        self.engine().current_state()
    }

    /// Name of the current state.
    fn state_name(&self) -> &'static str {
        self.current_state().name()
    }

    /// Restore the initial state.
    fn reset(&mut self) {
        self.engine_mut().reset()
    }

    /// Dispatch an external event through one of the host's tables.
    ///
    /// Looks up the current state in the table selected by `table`. A
    /// missing entry resolves to `IGNORING_EVENT` with no transition record.
    fn react<F>(&mut self, table: F)
    where
        F: FnOnce(&Self) -> &TransitionTable<Self::State, Self>,
    {
        let (destination, transition) = resolve(table(self), self.current_state());
        self.request_transition(destination, transition);
    }

    /// Dispatch an external event through a table not owned by the host.
    fn react_to(&mut self, table: &TransitionTable<Self::State, Self>) {
        let (destination, transition) = resolve(table, self.current_state());
        self.request_transition(destination, transition);
    }

    /// Request a transition to `destination`.
    ///
    /// Called from outside with the record resolved from a table, or from
    /// inside a guard or action, usually with no record. Inside an active
    /// evaluation the request is only stored and picked up by the running
    /// loop once the current transition settles.
    ///
    /// # Panics
    ///
    /// Panics with a [`Fault`] payload when the destination is
    /// `CANNOT_HAPPEN` or lies at or beyond `MAX_STATES`. A panic raised by
    /// a callback propagates unchanged after the pending request and the
    /// re-entrancy flag are cleared; the current state is left wherever the
    /// interrupted transition had moved it.
    fn request_transition(
        &mut self,
        destination: Self::State,
        transition: Option<Transition<Self::State, Self>>,
    ) {
        execute(self, destination, transition)
    }
}

fn resolve<S: StateId, H>(
    table: &TransitionTable<S, H>,
    current: S,
) -> (S, Option<Transition<S, H>>) {
    match table.lookup(current) {
        Some(transition) => {
            debug!(
                event = table.event(),
                state = current.name(),
                destination = transition.destination.name(),
                "event resolved"
            );
            (transition.destination, Some(transition.clone()))
        }
        None => {
            debug!(
                event = table.event(),
                state = current.name(),
                "no transition for event"
            );
            (S::IGNORING_EVENT, None)
        }
    }
}

fn execute<M: StateMachine>(
    machine: &mut M,
    destination: M::State,
    transition: Option<Transition<M::State, M>>,
) {
    debug!(state = machine.state_name(), "reacting to event");

    let engine = machine.engine_mut();
    let request = Request {
        destination,
        transition,
    };
    if let Some(superseded) = engine.pending.replace(request) {
        warn!(
            superseded = superseded.destination.name(),
            destination = destination.name(),
            "pending transition superseded"
        );
    }

    // Internal event: the loop running below us will pick it up.
    if engine.nesting {
        debug!(
            destination = destination.name(),
            "internal event, deferring transition"
        );
        return;
    }

    let drained = panic::catch_unwind(AssertUnwindSafe(|| {
        while let Some(request) = machine.engine_mut().pending.take() {
            step(machine, request);
        }
    }));

    // A panicking callback must not leave the engine stuck deferring.
    if let Err(payload) = drained {
        let engine = machine.engine_mut();
        engine.pending = None;
        engine.nesting = false;
        panic::resume_unwind(payload);
    }
}

fn step<M: StateMachine>(machine: &mut M, request: Request<M::State, M>) {
    let Request {
        destination: next,
        transition,
    } = request;
    let source = machine.current_state();

    if next == M::State::CANNOT_HAPPEN {
        fatal(machine, Fault::Forbidden { state: source });
    }
    if next == M::State::IGNORING_EVENT {
        debug!(state = source.name(), "ignoring event");
        return;
    }
    if next.index() >= M::State::MAX_STATES.index() {
        fatal(
            machine,
            Fault::OutOfRange {
                state: source,
                destination: next,
            },
        );
    }

    // Speculative move: guards and actions already observe the destination.
    let engine = machine.engine_mut();
    engine.current = next;
    engine.nesting = true;
    let states = Arc::clone(&engine.states);

    let allowed = match transition.as_ref().and_then(|t| t.guard.as_ref()) {
        Some(guard) => guard.check(machine),
        None => true,
    };
    if !allowed {
        debug!(
            from = source.name(),
            to = next.name(),
            "transition refused by guard"
        );
        let engine = machine.engine_mut();
        engine.current = source;
        engine.pending = None;
        engine.nesting = false;
        return;
    }

    debug!(from = source.name(), to = next.name(), "transitioning");

    if let Some(action) = transition.as_ref().and_then(|t| t.action.as_ref()) {
        debug!(
            from = source.name(),
            to = next.name(),
            "running transition action"
        );
        action.run(machine);
    }

    let left = states.get(source);
    if let Some(onevent) = left.and_then(|record| record.onevent.as_ref()) {
        debug!(state = source.name(), "running on-event reaction");
        onevent.run(machine);
    } else if source != next {
        if let Some(leaving) = left.and_then(|record| record.leaving.as_ref()) {
            debug!(state = source.name(), "running leaving action");
            leaving.run(machine);
        }
        if let Some(entering) = states.get(next).and_then(|record| record.entering.as_ref()) {
            debug!(state = next.name(), "running entering action");
            entering.run(machine);
        }
    } else {
        debug!(state = source.name(), "self-transition, no action to perform");
    }

    machine.engine_mut().nesting = false;
}

fn fatal<M: StateMachine>(machine: &mut M, fault: Fault<M::State>) -> ! {
    error!(%fault, "state machine fault");

    // Requests made by the hook are only deferred, then dropped.
    let engine = machine.engine_mut();
    engine.pending = None;
    engine.nesting = true;

    machine.on_fault(&fault);

    let engine = machine.engine_mut();
    engine.pending = None;
    engine.nesting = false;
    panic::panic_any(fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateRecord;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    crate::state_enum! {
        enum Phase {
            A,
            B,
            C,
        }
    }

    struct Recorder {
        engine: Engine<Phase, Recorder>,
        calls: Vec<&'static str>,
        allow: bool,
        faults: usize,
        fallback: Option<Phase>,
    }

    impl StateMachine for Recorder {
        type State = Phase;

        fn engine(&self) -> &Engine<Phase, Self> {
            &self.engine
        }

        fn engine_mut(&mut self) -> &mut Engine<Phase, Self> {
            &mut self.engine
        }

        fn on_fault(&mut self, _fault: &Fault<Phase>) {
            self.faults += 1;
            if let Some(fallback) = self.fallback {
                self.request_transition(fallback, None);
            }
        }
    }

    fn recorder(states: StateTable<Phase, Recorder>) -> Recorder {
        Recorder {
            engine: Engine::new(Phase::A, states).unwrap(),
            calls: Vec::new(),
            allow: true,
            faults: 0,
            fallback: None,
        }
    }

    fn recorded_states() -> StateTable<Phase, Recorder> {
        StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new()
                    .entering(|r: &mut Recorder| r.calls.push("enter A"))
                    .leaving(|r: &mut Recorder| r.calls.push("leave A")),
            )
            .state(
                Phase::B,
                StateRecord::new()
                    .entering(|r: &mut Recorder| r.calls.push("enter B"))
                    .leaving(|r: &mut Recorder| r.calls.push("leave B")),
            )
            .build()
            .unwrap()
    }

    fn guarded(to: Phase) -> Transition<Phase, Recorder> {
        Transition::to(to)
            .when(|r: &mut Recorder| {
                r.calls.push("guard");
                r.allow
            })
            .action(|r: &mut Recorder| r.calls.push("action"))
    }

    #[test]
    fn engine_rejects_sentinel_initial_state() {
        let result = Engine::<Phase, Recorder>::new(Phase::IgnoringEvent, StateTable::empty());

        assert!(matches!(
            result,
            Err(BuildError::InvalidInitialState {
                state: "IGNORING_EVENT"
            })
        ));
    }

    #[test]
    fn ignoring_event_is_a_no_op() {
        let mut r = recorder(recorded_states());

        r.request_transition(Phase::IgnoringEvent, None);

        assert_eq!(r.current_state(), Phase::A);
        assert!(r.calls.is_empty());
        assert!(!r.engine.is_evaluating());
        assert!(!r.engine.has_pending());
    }

    #[test]
    fn state_change_runs_guard_action_leaving_entering() {
        let mut r = recorder(recorded_states());

        r.request_transition(Phase::B, Some(guarded(Phase::B)));

        assert_eq!(r.current_state(), Phase::B);
        assert_eq!(r.calls, vec!["guard", "action", "leave A", "enter B"]);
    }

    #[test]
    fn refused_guard_rolls_back() {
        let mut r = recorder(recorded_states());
        r.allow = false;

        r.request_transition(Phase::B, Some(guarded(Phase::B)));

        assert_eq!(r.current_state(), Phase::A);
        assert_eq!(r.calls, vec!["guard"]);
        assert!(!r.engine.is_evaluating());
    }

    #[test]
    fn guard_observes_speculative_state() {
        let mut r = recorder(StateTable::empty());
        let seen = Transition::to(Phase::C).when(|r: &mut Recorder| {
            let seen = r.current_state().name();
            r.calls.push(seen);
            false
        });

        r.request_transition(Phase::C, Some(seen));

        assert_eq!(r.calls, vec!["C"]);
        assert_eq!(r.current_state(), Phase::A);
    }

    #[test]
    fn request_from_refused_guard_is_discarded() {
        let mut r = recorder(recorded_states());
        let sneaky = Transition::to(Phase::B).when(|r: &mut Recorder| {
            r.request_transition(Phase::C, None);
            false
        });

        r.request_transition(Phase::B, Some(sneaky));

        assert_eq!(r.current_state(), Phase::A);
        assert!(r.calls.is_empty());
        assert!(!r.engine.has_pending());
    }

    #[test]
    fn self_transition_only_runs_action() {
        let mut r = recorder(recorded_states());

        r.request_transition(Phase::A, Some(guarded(Phase::A)));

        assert_eq!(r.current_state(), Phase::A);
        assert_eq!(r.calls, vec!["guard", "action"]);
    }

    #[test]
    fn on_event_skips_entry_and_exit() {
        let states = StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new()
                    .leaving(|r: &mut Recorder| r.calls.push("leave A"))
                    .on_event(|r: &mut Recorder| r.calls.push("on event A")),
            )
            .state(
                Phase::B,
                StateRecord::new().entering(|r: &mut Recorder| r.calls.push("enter B")),
            )
            .build()
            .unwrap();
        let mut r = recorder(states);

        r.request_transition(Phase::B, Some(guarded(Phase::B)));

        assert_eq!(r.calls, vec!["guard", "action", "on event A"]);
        assert_eq!(r.current_state(), Phase::B);
        assert!(!r.engine.is_evaluating());
    }

    #[test]
    fn internal_request_is_deferred_until_transition_settles() {
        let states = StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new().leaving(|r: &mut Recorder| r.calls.push("leave A")),
            )
            .state(
                Phase::B,
                StateRecord::new()
                    .entering(|r: &mut Recorder| {
                        r.calls.push("enter B");
                        r.request_transition(Phase::C, None);
                        r.calls.push("enter B done");
                    })
                    .leaving(|r: &mut Recorder| r.calls.push("leave B")),
            )
            .state(
                Phase::C,
                StateRecord::new().entering(|r: &mut Recorder| r.calls.push("enter C")),
            )
            .build()
            .unwrap();
        let mut r = recorder(states);

        r.request_transition(Phase::B, Some(guarded(Phase::B)));

        assert_eq!(r.current_state(), Phase::C);
        assert_eq!(
            r.calls,
            vec![
                "guard",
                "action",
                "leave A",
                "enter B",
                "enter B done",
                "leave B",
                "enter C"
            ]
        );
    }

    #[test]
    fn deferred_request_does_not_reuse_enclosing_record() {
        let states = StateTable::builder()
            .state(
                Phase::B,
                StateRecord::new().entering(|r: &mut Recorder| r.request_transition(Phase::C, None)),
            )
            .build()
            .unwrap();
        let mut r = recorder(states);

        r.request_transition(Phase::B, Some(guarded(Phase::B)));

        assert_eq!(r.current_state(), Phase::C);
        assert_eq!(r.calls, vec!["guard", "action"]);
    }

    #[test]
    fn later_internal_request_supersedes_earlier_one() {
        let action = Transition::to(Phase::B).action(|r: &mut Recorder| {
            r.request_transition(Phase::A, None);
            r.request_transition(Phase::C, None);
        });
        let mut r = recorder(StateTable::empty());

        r.request_transition(Phase::B, Some(action));

        assert_eq!(r.current_state(), Phase::C);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut r = recorder(recorded_states());
        r.request_transition(Phase::B, None);
        r.request_transition(Phase::C, None);
        assert_eq!(r.current_state(), Phase::C);

        r.reset();

        assert_eq!(r.current_state(), Phase::A);
        assert_eq!(r.engine.initial_state(), Phase::A);
        assert!(!r.engine.is_evaluating());
        assert!(!r.engine.has_pending());
    }

    #[test]
    fn forbidden_destination_is_fatal() {
        let mut r = recorder(recorded_states());

        let result = catch_unwind(AssertUnwindSafe(|| {
            r.request_transition(Phase::CannotHappen, Some(guarded(Phase::CannotHappen)))
        }));

        let payload = result.unwrap_err();
        let fault = payload.downcast_ref::<Fault<Phase>>().unwrap();
        assert_eq!(*fault, Fault::Forbidden { state: Phase::A });
        assert_eq!(r.faults, 1);
        assert!(r.calls.is_empty());
        assert_eq!(r.current_state(), Phase::A);
    }

    #[test]
    fn out_of_range_destination_is_fatal() {
        let mut r = recorder(recorded_states());

        let result = catch_unwind(AssertUnwindSafe(|| {
            r.request_transition(Phase::MaxStates, None)
        }));

        let payload = result.unwrap_err();
        assert_eq!(
            payload.downcast_ref::<Fault<Phase>>(),
            Some(&Fault::OutOfRange {
                state: Phase::A,
                destination: Phase::MaxStates
            })
        );
        assert!(r.calls.is_empty());
        assert!(!r.engine.is_evaluating());
    }

    #[test]
    fn engines_can_share_one_state_table() {
        let states = Arc::new(recorded_states());
        let mut first = recorder(StateTable::empty());
        first.engine = Engine::with_shared_states(Phase::A, Arc::clone(&states)).unwrap();
        let mut second = recorder(StateTable::empty());
        second.engine = Engine::with_shared_states(Phase::B, states).unwrap();

        first.request_transition(Phase::B, None);
        second.request_transition(Phase::A, None);

        assert_eq!(first.calls, vec!["leave A", "enter B"]);
        assert_eq!(second.calls, vec!["leave B", "enter A"]);
    }

    #[test]
    fn react_to_looks_up_current_state() {
        let table = TransitionTable::builder("go")
            .on(Phase::A, guarded(Phase::B))
            .build()
            .unwrap();
        let mut r = recorder(recorded_states());

        r.react_to(&table);
        assert_eq!(r.current_state(), Phase::B);

        r.calls.clear();
        r.react_to(&table);
        assert_eq!(r.current_state(), Phase::B);
        assert!(r.calls.is_empty());
    }

    #[test]
    fn callback_panic_leaves_engine_usable() {
        let jammed = Transition::to(Phase::B).action(|r: &mut Recorder| {
            r.request_transition(Phase::C, None);
            panic!("actuator jammed");
        });
        let mut r = recorder(recorded_states());

        let result = catch_unwind(AssertUnwindSafe(|| {
            r.request_transition(Phase::B, Some(jammed))
        }));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"actuator jammed"));
        assert!(!r.engine.is_evaluating());
        assert!(!r.engine.has_pending());
        assert_eq!(r.faults, 0);
        assert_eq!(r.current_state(), Phase::B);

        r.request_transition(Phase::A, None);

        assert_eq!(r.current_state(), Phase::A);
        assert_eq!(r.calls, vec!["leave B", "enter A"]);
    }

    #[test]
    fn on_event_self_transition_skips_entry_and_exit() {
        let states = StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new()
                    .entering(|r: &mut Recorder| r.calls.push("enter A"))
                    .leaving(|r: &mut Recorder| r.calls.push("leave A"))
                    .on_event(|r: &mut Recorder| r.calls.push("on event A")),
            )
            .build()
            .unwrap();
        let mut r = recorder(states);

        r.request_transition(Phase::A, Some(guarded(Phase::A)));

        assert_eq!(r.calls, vec!["guard", "action", "on event A"]);
        assert_eq!(r.current_state(), Phase::A);
    }

    #[test]
    fn request_from_on_event_is_resolved_against_reacting_state() {
        let states = StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new()
                    .leaving(|r: &mut Recorder| r.calls.push("leave A"))
                    .on_event(|r: &mut Recorder| {
                        r.calls.push("on event A");
                        r.request_transition(Phase::C, None);
                    }),
            )
            .state(
                Phase::C,
                StateRecord::new().entering(|r: &mut Recorder| r.calls.push("enter C")),
            )
            .build()
            .unwrap();
        let mut r = recorder(states);
        let stay = Transition::to(Phase::A).action(|r: &mut Recorder| r.calls.push("action"));

        r.request_transition(Phase::A, Some(stay));

        // The deferred move to C still leaves A, so A reacts again in place
        // of leaving; its second request is then a plain self-transition.
        assert_eq!(r.calls, vec!["action", "on event A", "on event A"]);
        assert_eq!(r.current_state(), Phase::C);
        assert!(!r.engine.is_evaluating());
        assert!(!r.engine.has_pending());
    }

    #[test]
    fn ignored_event_skips_on_event() {
        let states = StateTable::builder()
            .state(
                Phase::A,
                StateRecord::new().on_event(|r: &mut Recorder| r.calls.push("on event A")),
            )
            .build()
            .unwrap();
        let ignored = TransitionTable::builder("ignored")
            .on(Phase::A, Transition::ignore())
            .build()
            .unwrap();
        let unmodeled = TransitionTable::builder("unmodeled").build().unwrap();
        let mut r = recorder(states);

        r.react_to(&ignored);
        r.react_to(&unmodeled);
        r.request_transition(Phase::IgnoringEvent, None);

        assert!(r.calls.is_empty());
        assert_eq!(r.current_state(), Phase::A);
    }

    #[test]
    fn requests_from_fault_hook_are_discarded() {
        let mut r = recorder(recorded_states());
        r.fallback = Some(Phase::B);

        let result = catch_unwind(AssertUnwindSafe(|| {
            r.request_transition(Phase::CannotHappen, None)
        }));

        assert!(result.is_err());
        assert_eq!(r.faults, 1);
        assert!(r.calls.is_empty());
        assert_eq!(r.current_state(), Phase::A);
        assert!(!r.engine.is_evaluating());
        assert!(!r.engine.has_pending());
    }
}
