//! Lock-guarded plugin state
//!
//! Plugin state is only reachable through a closure executed while the lock
//! is held, so no reference to it can escape the critical section. The lock
//! is not reentrant: code running inside `lock` receives `&mut S` and must
//! pass that on instead of locking again.
//!
//! The lock is independent of the task proxy. Network callbacks never take
//! it, so there is no lock ordering between the worker and main contexts.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Mutable plugin fields behind a blocking mutex
pub struct PluginState<M: RawMutex, S> {
    inner: Mutex<M, RefCell<S>>,
}

impl<M: RawMutex, S> PluginState<M, S> {
    /// Wrap the initial state
    pub const fn new(state: S) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(state)),
        }
    }

    /// Run `f` with exclusive access to the state
    ///
    /// Keep `f` short: no network calls, no filesystem access.
    ///
    /// # Panics
    /// If called again from within `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

impl<M: RawMutex, S: Clone> PluginState<M, S> {
    /// Copy of the current state
    pub fn snapshot(&self) -> S {
        self.lock(|s| s.clone())
    }
}
