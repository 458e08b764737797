//! Date/time plugin
//!
//! Shows the local time and/or date read from the wall clock, with a row of
//! seven lamps marking the weekday (Monday first). No network access; while
//! the plugin is visible a one second check timer drives the refresh.
//!
//! In [`DisplayMode::DateTime`] the time is shown during the first half of
//! the slot duration and the date during the second half. Slots without a
//! time limit switch every [`DEFAULT_CYCLE_MS`] / 2.

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;
use log::{info, warn};
use pixelix_hal::{Clock, Color, ConfigStore, DateTime, RenderSurface, WallClock};
use serde::{Deserialize, Serialize};

use super::FALLBACK_TEXT;
use crate::config::{self, ConfigError, MAX_PATH_LEN};
use crate::plugin::{Plugin, PluginState};
use crate::text::{format_date_time, DATE_TIME_LEN};
use crate::timer::Timer;

/// Period of the check timer while the plugin is visible (ms)
pub const CHECK_UPDATE_PERIOD_MS: u32 = 1000;

/// Time/date cycle used if the slot has no time limit (ms)
pub const DEFAULT_CYCLE_MS: u32 = 10 * 1000;

/// Number of weekday lamps
pub const MAX_LAMPS: usize = 7;

/// Time format
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Date format
pub const DATE_FORMAT: &str = "%d.%m.";

/// What the plugin shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Alternate between time and date
    #[default]
    DateTime,
    DateOnly,
    TimeOnly,
}

/// Persisted settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateTimeConfig {
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shown {
    Time,
    Date,
}

struct DateTimeState {
    mode: DisplayMode,
    slot_duration_ms: u32,
    check_timer: Timer,
    /// Check timer ticks since the plugin became visible
    duration_counter: u32,
    shown_second: Option<u8>,
    shown_year_day: Option<u16>,
    text: String<DATE_TIME_LEN>,
    lamps: [bool; MAX_LAMPS],
    update_available: bool,
}

impl DateTimeState {
    const fn new() -> Self {
        Self {
            mode: DisplayMode::DateTime,
            slot_duration_ms: 0,
            check_timer: Timer::new(),
            duration_counter: 0,
            shown_second: None,
            shown_year_day: None,
            text: String::new(),
            lamps: [false; MAX_LAMPS],
            update_available: false,
        }
    }

    /// Decide between time and date; may force a refresh on a switch
    fn select(&mut self, force: &mut bool) -> Shown {
        match self.mode {
            DisplayMode::DateOnly => Shown::Date,
            DisplayMode::TimeOnly => Shown::Time,
            DisplayMode::DateTime => {
                let duration = match self.slot_duration_ms {
                    0 => DEFAULT_CYCLE_MS,
                    d => d,
                };
                let half_ticks = duration / (2 * 1000);
                let full_ticks = 2 * half_ticks;

                let shown = if half_ticks >= self.duration_counter
                    || full_ticks < self.duration_counter
                {
                    Shown::Time
                } else {
                    Shown::Date
                };

                if full_ticks < self.duration_counter {
                    self.duration_counter = 0;
                }

                if self.duration_counter == 0 || self.duration_counter == half_ticks + 1 {
                    *force = true;
                }

                shown
            }
        }
    }

    fn refresh(&mut self, now: Option<DateTime>, mut force: bool) {
        let Some(now) = now else {
            if force {
                self.text.clear();
                let _ = self.text.push_str(FALLBACK_TEXT);
                self.lamps = [false; MAX_LAMPS];
                self.update_available = true;
            }
            return;
        };

        match self.select(&mut force) {
            Shown::Time => {
                if force || self.shown_second != Some(now.second) {
                    if let Some(text) = format_date_time(TIME_FORMAT, &now) {
                        self.text = text;
                        self.shown_second = Some(now.second);
                        self.update_available = true;
                    }
                    self.set_weekday(now.weekday);
                }
            }
            Shown::Date => {
                if force || self.shown_year_day != Some(now.year_day) {
                    if let Some(text) = format_date_time(DATE_FORMAT, &now) {
                        self.text = text;
                        self.shown_year_day = Some(now.year_day);
                        self.update_available = true;
                    }
                    self.set_weekday(now.weekday);
                }
            }
        }
    }

    /// `weekday` counts from Sunday, the first lamp is Monday
    fn set_weekday(&mut self, weekday: u8) {
        let active = match weekday {
            1..=6 => usize::from(weekday) - 1,
            _ => MAX_LAMPS - 1,
        };
        self.lamps = [false; MAX_LAMPS];
        self.lamps[active] = true;
    }
}

/// Date/time plugin
pub struct DateTimePlugin<'a, M: RawMutex, K, W, S> {
    uid: u16,
    clock: &'a K,
    wall_clock: &'a W,
    store: &'a S,
    config_path: String<MAX_PATH_LEN>,
    state: PluginState<M, DateTimeState>,
}

impl<'a, M, K, W, S> DateTimePlugin<'a, M, K, W, S>
where
    M: RawMutex,
    K: Clock,
    W: WallClock,
    S: ConfigStore,
{
    /// Create the plugin
    pub fn new(uid: u16, clock: &'a K, wall_clock: &'a W, store: &'a S) -> Self {
        Self {
            uid,
            clock,
            wall_clock,
            store,
            config_path: config::config_path(uid),
            state: PluginState::new(DateTimeState::new()),
        }
    }

    /// Current display mode
    pub fn mode(&self) -> DisplayMode {
        self.state.lock(|s| s.mode)
    }

    /// Change the display mode and persist it
    pub fn set_mode(&self, mode: DisplayMode) -> Result<(), ConfigError> {
        self.state.lock(|s| {
            if s.mode != mode {
                s.mode = mode;
                s.duration_counter = 0;
            }
        });

        config::save(self.store, &self.config_path, &DateTimeConfig { mode })
    }
}

impl<'a, M, K, W, S> Plugin for DateTimePlugin<'a, M, K, W, S>
where
    M: RawMutex + Sync,
    K: Clock,
    W: WallClock,
    S: ConfigStore,
{
    fn name(&self) -> &'static str {
        "DateTimePlugin"
    }

    fn uid(&self) -> u16 {
        self.uid
    }

    fn set_slot_duration(&self, duration_ms: u32) {
        self.state.lock(|s| s.slot_duration_ms = duration_ms);
    }

    fn start(&self, _width: u16, _height: u16) {
        let config: DateTimeConfig = config::load_or_init(self.store, &self.config_path);
        info!("Date/time mode {:?}", config.mode);

        self.state.lock(|s| s.mode = config.mode);
    }

    fn stop(&self) {
        self.state.lock(|s| s.check_timer.stop());
        config::remove(self.store, &self.config_path);
    }

    fn process(&self) {
        let now_ms = self.clock.now_ms();

        let due = self.state.lock(|s| {
            if s.check_timer.is_timeout(now_ms) {
                s.duration_counter += 1;
                s.check_timer.restart(now_ms);
                true
            } else {
                false
            }
        });

        if due {
            let now = self.wall_clock.local_time();
            self.state.lock(|s| s.refresh(now, false));
        }
    }

    fn active(&self, _gfx: &mut dyn RenderSurface) {
        let now_ms = self.clock.now_ms();
        let now = self.wall_clock.local_time();
        if now.is_none() {
            warn!("Wall clock not synchronized.");
        }

        self.state.lock(|s| {
            s.duration_counter = 0;
            s.check_timer.start(CHECK_UPDATE_PERIOD_MS, now_ms);
            s.refresh(now, true);
        });
    }

    fn inactive(&self) {
        self.state.lock(|s| s.check_timer.stop());
    }

    fn update(&self, gfx: &mut dyn RenderSurface) {
        self.state.lock(|s| {
            if !s.update_available {
                return;
            }

            gfx.fill_background(Color::BLACK);
            gfx.set_icon(None);
            gfx.set_text(&s.text);
            for (index, on) in s.lamps.iter().enumerate() {
                gfx.set_lamp(index, *on);
            }

            s.update_available = false;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemStore, MockClock, MockWallClock};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use pixelix_display::Frame;
    use std::vec::Vec;

    type TestPlugin<'a> = DateTimePlugin<'a, CriticalSectionRawMutex, MockClock, MockWallClock, MemStore>;

    // Thursday, 7 March 2024
    fn at(hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime {
            year: 2024,
            month: 3,
            day: 7,
            hour,
            minute,
            second,
            weekday: 4,
            year_day: 66,
        }
    }

    struct Env {
        clock: MockClock,
        wall: MockWallClock,
        store: MemStore,
    }

    impl Env {
        fn new() -> Self {
            let env = Self {
                clock: MockClock::new(),
                wall: MockWallClock::new(),
                store: MemStore::new(),
            };
            env.wall.set(Some(at(12, 30, 0)));
            env
        }

        fn plugin(&self) -> TestPlugin<'_> {
            DateTimePlugin::new(9, &self.clock, &self.wall, &self.store)
        }

        /// One check timer period passes
        fn tick(&self, plugin: &TestPlugin<'_>, time: DateTime) {
            self.wall.set(Some(time));
            self.clock.advance(u64::from(CHECK_UPDATE_PERIOD_MS));
            plugin.process();
        }
    }

    fn lit(frame: &Frame) -> Vec<usize> {
        (0..MAX_LAMPS).filter(|&i| frame.lamp(i)).collect()
    }

    #[test]
    fn test_active_shows_time_and_weekday() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);

        assert_eq!(frame.text(), "12:30:00");
        assert_eq!(lit(&frame), [3], "Thursday is the fourth lamp");
    }

    #[test]
    fn test_sunday_is_last_lamp() {
        let env = Env::new();
        let mut sunday = at(8, 0, 0);
        sunday.weekday = 0;
        env.wall.set(Some(sunday));

        let plugin = env.plugin();
        let mut frame = Frame::new();
        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);
        assert_eq!(lit(&frame), [6]);
    }

    #[test]
    fn test_unsynchronized_clock_shows_fallback() {
        let env = Env::new();
        env.wall.set(None);
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);
        assert_eq!(frame.text(), FALLBACK_TEXT);
        assert!(lit(&frame).is_empty());
    }

    #[test]
    fn test_renders_only_on_change() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);
        frame.mark_clean();

        // Same second again: nothing new
        env.tick(&plugin, at(12, 30, 0));
        plugin.update(&mut frame);
        assert!(!frame.is_dirty());

        env.tick(&plugin, at(12, 30, 1));
        plugin.update(&mut frame);
        assert!(frame.is_dirty());
        assert_eq!(frame.text(), "12:30:01");
    }

    #[test]
    fn test_time_then_date_within_slot() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.set_slot_duration(4000);
        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "12:30:00");

        // Half duration is two ticks
        env.tick(&plugin, at(12, 30, 1));
        env.tick(&plugin, at(12, 30, 2));
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "12:30:02");

        env.tick(&plugin, at(12, 30, 3));
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "07.03.");

        env.tick(&plugin, at(12, 30, 4));
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "07.03.");

        // Full duration over, back to the time
        env.tick(&plugin, at(12, 30, 5));
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "12:30:05");
    }

    #[test]
    fn test_unlimited_slot_uses_default_cycle() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.start(32, 8);
        plugin.active(&mut frame);

        let half_ticks = DEFAULT_CYCLE_MS / 2000;
        for second in 1..=half_ticks {
            env.tick(&plugin, at(12, 30, second as u8));
        }
        plugin.update(&mut frame);
        assert_eq!(frame.text(), alloc::format!("12:30:{:02}", half_ticks));

        env.tick(&plugin, at(12, 30, half_ticks as u8 + 1));
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "07.03.");
    }

    #[test]
    fn test_date_only_mode_persists() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();
        plugin.start(32, 8);

        plugin.set_mode(DisplayMode::DateOnly).unwrap();
        assert_eq!(plugin.mode(), DisplayMode::DateOnly);

        plugin.active(&mut frame);
        plugin.update(&mut frame);
        assert_eq!(frame.text(), "07.03.");

        // A new instance picks the mode up from storage
        let again = env.plugin();
        again.start(32, 8);
        assert_eq!(again.mode(), DisplayMode::DateOnly);
    }

    #[test]
    fn test_inactive_stops_checking() {
        let env = Env::new();
        let plugin = env.plugin();
        let mut frame = Frame::new();

        plugin.start(32, 8);
        plugin.active(&mut frame);
        plugin.update(&mut frame);
        plugin.inactive();
        frame.mark_clean();

        env.tick(&plugin, at(12, 31, 0));
        plugin.update(&mut frame);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_stop_removes_config() {
        let env = Env::new();
        let plugin = env.plugin();
        plugin.start(32, 8);
        assert!(env.store.contains("/configuration/9.bin"));

        plugin.stop();
        assert!(!env.store.contains("/configuration/9.bin"));
    }
}
