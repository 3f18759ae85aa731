//! Side-effecting reactions bound to the host machine.

use std::fmt;
use std::sync::Arc;

/// Reaction run by the engine: a transition action, or a state's
/// entering, leaving or on-event handler.
///
/// Cloning only bumps a reference count, so state and transition records
/// stay cheap to copy out of the sealed tables while the host is borrowed.
pub struct Action<H> {
    reaction: Arc<dyn Fn(&mut H) + Send + Sync>,
}

impl<H> Action<H> {
    /// Create an action from a function or closure.
    pub fn new<F>(reaction: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        Action {
            reaction: Arc::new(reaction),
        }
    }

    /// Run the action against the host.
    pub fn run(&self, host: &mut H) {
        (self.reaction)(host)
    }
}

impl<H> Clone for Action<H> {
    fn clone(&self) -> Self {
        Self {
            reaction: Arc::clone(&self.reaction),
        }
    }
}

impl<H> fmt::Debug for Action<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}
