//! State identifiers understood by the transition engine.
//!
//! Every concrete machine enumerates its real states followed by three
//! reserved values. The `state_enum!` macro generates a conforming enum.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers.
///
/// A state identifier is a small, zero-based, totally ordered enumeration.
/// Three values are reserved and never name a real state:
///
/// - `IGNORING_EVENT`: no transition, no action, stay put
/// - `CANNOT_HAPPEN`: the event is forbidden in this state (fatal)
/// - `MAX_STATES`: exclusive upper bound used for bounds checking and sizing
///
/// # Example
///
/// ```rust
/// use statechart_engine::core::StateId;
///
/// #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
///     IgnoringEvent,
///     CannotHappen,
///     MaxStates,
/// }
///
/// const DOORS: [Door; 5] = [
///     Door::Open,
///     Door::Closed,
///     Door::IgnoringEvent,
///     Door::CannotHappen,
///     Door::MaxStates,
/// ];
///
/// impl StateId for Door {
///     const IGNORING_EVENT: Self = Door::IgnoringEvent;
///     const CANNOT_HAPPEN: Self = Door::CannotHappen;
///     const MAX_STATES: Self = Door::MaxStates;
///
///     fn index(self) -> usize {
///         self as usize
///     }
///
///     fn from_index(index: usize) -> Option<Self> {
///         DOORS.get(index).copied()
///     }
///
///     fn name(self) -> &'static str {
///         match self {
///             Door::Open => "Open",
///             Door::Closed => "Closed",
///             Door::IgnoringEvent => "IGNORING_EVENT",
///             Door::CannotHappen => "CANNOT_HAPPEN",
///             Door::MaxStates => "MAX_STATES",
///         }
///     }
/// }
///
/// assert!(Door::Open.is_real());
/// assert!(!Door::CannotHappen.is_real());
/// ```
pub trait StateId: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Signals "no transition, no action, stay put".
    const IGNORING_EVENT: Self;

    /// Signals a forbidden or unmodeled event. Reaching it is fatal.
    const CANNOT_HAPPEN: Self;

    /// Exclusive upper bound of the state range.
    const MAX_STATES: Self;

    /// Zero-based position of this identifier.
    fn index(self) -> usize;

    /// Inverse of [`StateId::index`].
    fn from_index(index: usize) -> Option<Self>;

    /// Name of the state for diagnostics.
    ///
    /// Returns a static string so logging never allocates.
    fn name(self) -> &'static str;

    /// Check if this identifier names a real state.
    fn is_real(self) -> bool {
        self != Self::IGNORING_EVENT
            && self != Self::CANNOT_HAPPEN
            && self.index() < Self::MAX_STATES.index()
    }
}

/// Iterate over the real states of `S` in index order.
pub fn real_states<S: StateId>() -> impl Iterator<Item = S> {
    (0..S::MAX_STATES.index())
        .filter_map(S::from_index)
        .filter(|state| state.is_real())
}
