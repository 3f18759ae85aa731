//! Lock-guarded machines for hosts driven from several threads.
//!
//! Choosing between a bare host and a [`SharedMachine`] is made once, at
//! construction. The lock only serializes independent callers: internal
//! transition requests made by guards and actions go through the engine's
//! re-entrancy flag and never touch the lock.

use crate::engine::StateMachine;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Cloneable handle to a host machine protected by a lock.
///
/// Every [`SharedMachine::dispatch`] holds the lock for the whole call, so
/// one transition evaluation at most is active at a time. A dispatch from
/// the thread already inside a dispatch does not deadlock: it is ignored
/// and returns `None`.
///
/// # Example
///
/// ```rust
/// use statechart_engine::builder::{StateTable, Transition, TransitionTable};
/// use statechart_engine::engine::{Engine, StateMachine};
/// use statechart_engine::shared::SharedMachine;
/// use statechart_engine::state_enum;
///
/// state_enum! {
///     enum Valve {
///         Closed,
///         Open,
///     }
/// }
///
/// struct Pipe {
///     engine: Engine<Valve, Pipe>,
///     open: TransitionTable<Valve, Pipe>,
/// }
///
/// impl StateMachine for Pipe {
///     type State = Valve;
///
///     fn engine(&self) -> &Engine<Valve, Self> {
///         &self.engine
///     }
///
///     fn engine_mut(&mut self) -> &mut Engine<Valve, Self> {
///         &mut self.engine
///     }
/// }
///
/// let pipe = Pipe {
///     engine: Engine::new(Valve::Closed, StateTable::empty()).unwrap(),
///     open: TransitionTable::builder("open")
///         .on(Valve::Closed, Transition::to(Valve::Open))
///         .build()
///         .unwrap(),
/// };
///
/// let shared = SharedMachine::new(pipe);
/// let worker = shared.clone();
/// std::thread::spawn(move || worker.dispatch(|p| p.react(|p| &p.open)))
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.current_state(), Some(Valve::Open));
/// ```
pub struct SharedMachine<H> {
    inner: Arc<ReentrantMutex<RefCell<H>>>,
}

impl<H: StateMachine> SharedMachine<H> {
    /// Wrap a host behind a lock.
    pub fn new(host: H) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(host))),
        }
    }

    /// Run `f` with exclusive access to the host.
    ///
    /// Blocks while another thread dispatches. Returns `None` without
    /// running `f` when the calling thread is already inside a dispatch.
    pub fn dispatch<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut H) -> R,
    {
        let guard = self.inner.lock();
        let Ok(mut host) = guard.try_borrow_mut() else {
            debug!("machine already dispatching on this thread, ignoring");
            return None;
        };
        Some(f(&mut host))
    }

    /// Current state, `None` when called from inside a dispatch.
    pub fn current_state(&self) -> Option<H::State> {
        let guard = self.inner.lock();
        let host = guard.try_borrow().ok()?;
        Some(host.current_state())
    }

    /// Restore the initial state. Returns `false` if ignored.
    pub fn reset(&self) -> bool {
        self.dispatch(|host| host.reset()).is_some()
    }

    /// Take the host back if this is the last handle.
    pub fn into_inner(self) -> Result<H, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner().into_inner()),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<H> Clone for SharedMachine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> fmt::Debug for SharedMachine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMachine")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
