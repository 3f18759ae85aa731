//! Guard predicates for controlling state transitions.
//!
//! A guard is evaluated before a transition commits. Returning `false`
//! refuses the transition and no action of any kind runs.

use std::fmt;
use std::sync::Arc;

/// Predicate bound to the host machine that decides if a transition can run.
///
/// Guards receive the host mutably: they are allowed to inspect any host
/// data and to request a further transition, which the engine defers.
///
/// # Example
///
/// ```rust
/// use statechart_engine::core::Guard;
///
/// struct Motor {
///     speed: u32,
/// }
///
/// fn below_limit(motor: &mut Motor) -> bool {
///     motor.speed < 100
/// }
///
/// let guard = Guard::new(below_limit);
///
/// assert!(guard.check(&mut Motor { speed: 10 }));
/// assert!(!guard.check(&mut Motor { speed: 250 }));
/// ```
pub struct Guard<H> {
    predicate: Arc<dyn Fn(&mut H) -> bool + Send + Sync>,
}

impl<H> Guard<H> {
    /// Create a guard from a function or closure.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&mut H) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the host.
    pub fn check(&self, host: &mut H) -> bool {
        (self.predicate)(host)
    }
}

impl<H> Clone for Guard<H> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<H> fmt::Debug for Guard<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
