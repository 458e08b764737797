//! Slot rotation
//!
//! Drives the plugin lifecycle from the main loop. Every installed plugin
//! occupies a slot with a display duration. All plugins are processed on
//! every iteration; only the plugin in the current slot is active and
//! rendered. When the slot timer expires the next slot becomes current.
//! A duration of `0` keeps the slot on screen until it is uninstalled.

use heapless::Vec;
use log::info;
use pixelix_hal::{Clock, RenderSurface};

use crate::plugin::Plugin;
use crate::timer::Timer;

/// Maximum number of slots
pub const MAX_SLOTS: usize = 8;

/// Slot management errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotError {
    /// All slots are occupied
    Full,
    /// No plugin with this uid is installed
    NotFound,
}

/// One installed plugin
#[derive(Clone, Copy)]
pub struct Slot<'a> {
    pub plugin: &'a dyn Plugin,
    /// Display duration (ms), `0` is unlimited
    pub duration_ms: u32,
}

/// Plugin slots shown one after another
pub struct SlotManager<'a, K> {
    clock: &'a K,
    width: u16,
    height: u16,
    slots: Vec<Slot<'a>, MAX_SLOTS>,
    /// Index of the visible slot
    current: Option<usize>,
    slot_timer: Timer,
}

impl<'a, K: Clock> SlotManager<'a, K> {
    /// Create an empty rotation for a matrix of `width` x `height`
    pub fn new(clock: &'a K, width: u16, height: u16) -> Self {
        Self {
            clock,
            width,
            height,
            slots: Vec::new(),
            current: None,
            slot_timer: Timer::new(),
        }
    }

    /// Install and start a plugin in the next free slot
    pub fn install(&mut self, plugin: &'a dyn Plugin, duration_ms: u32) -> Result<(), SlotError> {
        self.slots
            .push(Slot {
                plugin,
                duration_ms,
            })
            .map_err(|_| SlotError::Full)?;

        plugin.set_slot_duration(duration_ms);
        plugin.start(self.width, self.height);
        info!("{} ({}) installed.", plugin.name(), plugin.uid());
        Ok(())
    }

    /// Stop and remove the plugin with `uid`
    pub fn uninstall(&mut self, uid: u16) -> Result<&'a dyn Plugin, SlotError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.plugin.uid() == uid)
            .ok_or(SlotError::NotFound)?;
        let plugin = self.slots[index].plugin;

        match self.current {
            Some(current) if current == index => {
                plugin.inactive();
                self.current = None;
                self.slot_timer.stop();
            }
            Some(current) if current > index => self.current = Some(current - 1),
            _ => {}
        }

        plugin.stop();
        self.slots.remove(index);
        info!("{} ({}) uninstalled.", plugin.name(), uid);
        Ok(plugin)
    }

    /// Number of installed plugins
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Plugin currently on screen
    pub fn current(&self) -> Option<&'a dyn Plugin> {
        self.current.map(|index| self.slots[index].plugin)
    }

    /// One main loop iteration
    pub fn process(&mut self, gfx: &mut dyn RenderSurface) {
        for slot in &self.slots {
            slot.plugin.process();
        }

        if self.slots.is_empty() {
            return;
        }

        let now = self.clock.now_ms();

        match self.current {
            None => self.activate(0, now, gfx),
            Some(current) if self.slot_timer.is_timeout(now) => {
                let next = (current + 1) % self.slots.len();
                if next == current {
                    self.slot_timer.restart(now);
                } else {
                    self.slots[current].plugin.inactive();
                    self.activate(next, now, gfx);
                }
            }
            Some(_) => {}
        }

        if let Some(current) = self.current {
            self.slots[current].plugin.update(gfx);
        }
    }

    fn activate(&mut self, index: usize, now: u64, gfx: &mut dyn RenderSurface) {
        let slot = self.slots[index];

        self.current = Some(index);
        match slot.duration_ms {
            0 => self.slot_timer.stop(),
            duration => self.slot_timer.start(duration, now),
        }

        slot.plugin.active(gfx);
    }
}
