//! Rendering surface abstraction
//!
//! Plugins never draw pixels themselves. They describe what should be shown
//! (background, icon, text, indicator lamps) and the surface implementation
//! takes care of fonts, bitmaps and layout.

/// RGB888 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIGHT_GRAY: Color = Color::rgb(211, 211, 211);
    pub const ULTRA_DARK_GRAY: Color = Color::rgb(32, 32, 32);

    /// Create a color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Handle to a bitmap in the device filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Icon(pub &'static str);

impl Icon {
    /// Filesystem path of the bitmap
    pub const fn path(&self) -> &'static str {
        self.0
    }
}

/// What a plugin may draw into
///
/// All operations are pure state mutation on the surface; no I/O happens
/// until the display manager flushes the frame.
pub trait RenderSurface {
    /// Fill the whole surface
    fn fill_background(&mut self, color: Color);

    /// Set the text shown next to the icon
    fn set_text(&mut self, text: &str);

    /// Set the icon, or remove it with `None`
    fn set_icon(&mut self, icon: Option<Icon>);

    /// Switch one of the indicator lamps below the text
    ///
    /// Surfaces without lamps ignore this.
    fn set_lamp(&mut self, _index: usize, _on: bool) {}
}
