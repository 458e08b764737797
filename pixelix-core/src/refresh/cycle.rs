//! Refresh cycle: when to issue the next request
//!
//! Every network-backed plugin refreshes the same way. A request is issued
//! when the plugin starts and whenever the request timer expires afterwards.
//! If the request could be issued, the timer is armed with the normal period.
//! If not (transport busy, no network, missing configuration), it is armed
//! with the short retry period so the plugin recovers quickly without
//! hammering the transport.
//!
//! The cycle keeps at most one request in flight. A request has finished
//! once its closed notification was consumed, which is always the last
//! message a request produces, or once it has been outstanding longer than
//! the request timeout, in which case it is considered lost.
//!
//! Issuing happens in three steps so the plugin lock is never held across
//! the network call:
//!
//! ```text
//! lock   { is_due?  reserve }
//!          client.get(url)
//! lock   { record(result) }
//! ```

use log::{debug, warn};

use super::RefreshError;
use crate::timer::Timer;

/// Time after which an unanswered request is considered lost (ms)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 10_000;

/// Request scheduling for one plugin
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshCycle {
    /// Request timer
    timer: Timer,
    /// Period after a successfully issued request (ms)
    period_ms: u32,
    /// Period after a request could not be issued (ms)
    retry_period_ms: u32,
    /// Time after which an outstanding request is abandoned (ms)
    request_timeout_ms: u32,
    /// When the outstanding request was issued
    in_flight_since: Option<u64>,
}

impl RefreshCycle {
    /// Create an idle cycle
    pub const fn new(period_ms: u32, retry_period_ms: u32) -> Self {
        Self {
            timer: Timer::new(),
            period_ms,
            retry_period_ms,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            in_flight_since: None,
        }
    }

    /// Override the time after which an outstanding request is abandoned
    pub const fn with_request_timeout(mut self, request_timeout_ms: u32) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }

    /// Check if the request timer expired
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.timer.is_running() && self.timer.is_timeout(now_ms)
    }

    /// Check if a new request may be issued now
    ///
    /// Fails with [`RefreshError::TransportBusy`] while another request is
    /// outstanding. Pass the outcome on to [`record`](Self::record) either way.
    pub fn reserve(&mut self, now_ms: u64) -> Result<(), RefreshError> {
        if self.is_request_pending(now_ms) {
            debug!("Previous request still outstanding, not issuing a new one.");
            return Err(RefreshError::TransportBusy);
        }

        if self.in_flight_since.take().is_some() {
            warn!("Request timed out without response, giving up on it.");
        }
        Ok(())
    }

    /// Arm the timer according to the outcome of an issue attempt
    pub fn record(&mut self, now_ms: u64, result: Result<(), RefreshError>) -> Result<(), RefreshError> {
        match result {
            Ok(()) => {
                self.in_flight_since = Some(now_ms);
                self.timer.start(self.period_ms, now_ms);
            }
            Err(_) => {
                self.timer.start(self.retry_period_ms, now_ms);
            }
        }

        result
    }

    /// The outstanding request was closed
    pub fn complete(&mut self) {
        self.in_flight_since = None;
    }

    /// Re-arm with the short period, e.g. after a transport error
    pub fn retry_soon(&mut self, now_ms: u64) {
        self.timer.start(self.retry_period_ms, now_ms);
    }

    /// Stop issuing requests
    pub fn stop(&mut self) {
        self.timer.stop();
        self.in_flight_since = None;
    }

    /// Check if the cycle is armed
    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Period the timer is currently armed with (ms)
    pub fn current_period_ms(&self) -> Option<u32> {
        self.timer.is_running().then(|| self.timer.period_ms())
    }

    /// Check if a request is outstanding and not yet considered lost
    pub fn is_request_pending(&self, now_ms: u64) -> bool {
        match self.in_flight_since {
            Some(since) => now_ms.saturating_sub(since) < u64::from(self.request_timeout_ms),
            None => false,
        }
    }
}
