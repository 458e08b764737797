//! Frame content buffer
//!
//! Records what the active plugin wants to show. The LED matrix driver
//! only has to redraw when the frame is dirty.

use heapless::String;
use pixelix_hal::{Color, Icon, RenderSurface};

/// Maximum characters of text a frame can hold
pub const TEXT_LEN: usize = 64;

/// Number of indicator lamps below the text
pub const MAX_LAMPS: usize = 7;

/// Content of one display frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    background: Color,
    icon: Option<Icon>,
    text: String<TEXT_LEN>,
    lamps: [bool; MAX_LAMPS],
    /// Whether the frame needs to be redrawn
    dirty: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create a new, empty frame
    pub const fn new() -> Self {
        Self {
            background: Color::BLACK,
            icon: None,
            text: String::new(),
            lamps: [false; MAX_LAMPS],
            dirty: true,
        }
    }

    /// Reset everything to an empty black frame
    pub fn clear(&mut self) {
        self.background = Color::BLACK;
        self.icon = None;
        self.text.clear();
        self.lamps = [false; MAX_LAMPS];
        self.dirty = true;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// State of an indicator lamp; out-of-range lamps are off
    pub fn lamp(&self, index: usize) -> bool {
        self.lamps.get(index).copied().unwrap_or(false)
    }

    /// Check if the frame needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark frame as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl RenderSurface for Frame {
    fn fill_background(&mut self, color: Color) {
        if self.background != color {
            self.background = color;
            self.dirty = true;
        }
    }

    fn set_text(&mut self, text: &str) {
        // Truncate on a character boundary if too long
        let mut truncated: String<TEXT_LEN> = String::new();
        for ch in text.chars() {
            if truncated.push(ch).is_err() {
                break;
            }
        }

        if truncated != self.text {
            self.text = truncated;
            self.dirty = true;
        }
    }

    fn set_icon(&mut self, icon: Option<Icon>) {
        if self.icon != icon {
            self.icon = icon;
            self.dirty = true;
        }
    }

    fn set_lamp(&mut self, index: usize, on: bool) {
        if let Some(lamp) = self.lamps.get_mut(index) {
            if *lamp != on {
                *lamp = on;
                self.dirty = true;
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame[{}, icon={}]", self.text.as_str(), self.icon);
    }
}
