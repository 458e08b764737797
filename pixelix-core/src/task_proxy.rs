//! Task proxy: bounded mailbox between execution contexts
//!
//! Network callbacks run on the transport's worker context and must not touch
//! plugin state. They push their result into the plugin's task proxy instead;
//! the plugin drains it from the main loop.
//!
//! The proxy is a thin wrapper around an embassy-sync [`Channel`], which is
//! internally synchronized through the raw mutex `M` and therefore independent
//! of the plugin's own lock. Both directions are strictly non-blocking.
//!
//! Messages are moved through the proxy. If a message owns heap data (a
//! boxed parse result), that ownership moves with it: a successful `send`
//! hands it to the consumer, a failed `send` hands it back to the producer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};

/// Bounded FIFO mailbox with capacity `N`
pub struct TaskProxy<M: RawMutex, T, const N: usize> {
    channel: Channel<M, T, N>,
}

impl<M: RawMutex, T, const N: usize> Default for TaskProxy<M, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, T, const N: usize> TaskProxy<M, T, N> {
    /// Create an empty proxy
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a message without blocking
    ///
    /// Returns the message back if the proxy is full. The queue is left
    /// untouched in that case, and the caller becomes responsible for the
    /// message again; dropping it releases whatever it owns.
    pub fn send(&self, msg: T) -> Result<(), T> {
        self.channel.try_send(msg).map_err(|e| match e {
            TrySendError::Full(msg) => msg,
        })
    }

    /// Dequeue the oldest pending message without blocking
    pub fn receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Drop every pending message
    ///
    /// Returns the number of discarded messages.
    pub fn clear(&self) -> usize {
        let mut count = 0;
        while self.receive().is_some() {
            count += 1;
        }
        count
    }

    /// Number of pending messages
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Check if no message is pending
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Check if the next `send` would fail
    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    /// Fixed capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}
