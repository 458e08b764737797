//! Software timer
//!
//! Timers hold no clock of their own. The owner passes the current time in
//! milliseconds, which keeps them plain data that can live inside a plugin's
//! locked state and be driven by a fake clock in tests.
//!
//! Drift policy: `restart` re-bases on the time it is called, not on the
//! previous deadline. Periodic jitter is tolerated, cumulative drift is not
//! corrected.

/// One-shot/periodic software timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    /// Configured period (ms)
    period_ms: u32,
    /// Time of the last (re)start (ms)
    start_ms: u64,
    /// Whether the timer is armed
    running: bool,
}

impl Timer {
    /// Create a stopped timer
    pub const fn new() -> Self {
        Self {
            period_ms: 0,
            start_ms: 0,
            running: false,
        }
    }

    /// Arm the timer with a new period, starting now
    pub fn start(&mut self, period_ms: u32, now_ms: u64) {
        self.period_ms = period_ms;
        self.start_ms = now_ms;
        self.running = true;
    }

    /// Disarm the timer
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Re-arm with the last configured period, starting now
    pub fn restart(&mut self, now_ms: u64) {
        self.start(self.period_ms, now_ms);
    }

    /// Check if the timer is armed
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Check if the configured period elapsed since the last (re)start
    ///
    /// Stays true until the timer is restarted or stopped. A stopped timer
    /// never times out.
    pub fn is_timeout(&self, now_ms: u64) -> bool {
        self.running && now_ms.saturating_sub(self.start_ms) >= u64::from(self.period_ms)
    }

    /// Configured period (ms)
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Remaining time until timeout, `None` when stopped
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if !self.running {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        Some(u64::from(self.period_ms).saturating_sub(elapsed))
    }
}
