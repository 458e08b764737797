//! Time sources
//!
//! Two different notions of time are used by the plugins: a monotonic
//! millisecond counter for timers, and the calendar time shown on the
//! display, which is only available once the device synchronized via NTP.

/// Monotonic millisecond clock
pub trait Clock: Sync {
    /// Milliseconds since an arbitrary, fixed origin (usually boot)
    fn now_ms(&self) -> u64;
}

/// Broken-down local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Full year, e.g. 2024
    pub year: u16,
    /// Month 1-12
    pub month: u8,
    /// Day of month 1-31
    pub day: u8,
    /// Hour 0-23
    pub hour: u8,
    /// Minute 0-59
    pub minute: u8,
    /// Second 0-59
    pub second: u8,
    /// Day of week, 0 = Sunday
    pub weekday: u8,
    /// Day of year, 0-365
    pub year_day: u16,
}

/// Calendar clock
pub trait WallClock: Sync {
    /// Current local time, or `None` while the clock is not synchronized
    fn local_time(&self) -> Option<DateTime>;
}
