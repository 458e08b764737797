//! Plugin lifecycle
//!
//! Every plugin is driven by the slot manager from the main loop with the
//! call sequence
//!
//! ```text
//! start(width, height)
//!   { process() [active(gfx) { update(gfx) } inactive()] }*
//! stop()
//! ```
//!
//! All lifecycle methods take `&self`. A plugin's mutable state lives behind
//! its own lock ([`PluginState`]) so admin accessors (e.g. the REST API
//! changing a host name) can run from another context while the main loop
//! keeps driving the plugin.

pub mod state;

pub use state::PluginState;

use pixelix_hal::RenderSurface;

/// Interface every plugin implements
pub trait Plugin: Sync {
    /// Plugin type name
    fn name(&self) -> &'static str;

    /// Unique id of this plugin instance
    fn uid(&self) -> u16;

    /// The slot the plugin was installed into tells how long it is shown
    ///
    /// `0` means the slot has no time limit.
    fn set_slot_duration(&self, _duration_ms: u32) {}

    /// Plugin was installed; allocate resources and kick off data refresh
    fn start(&self, width: u16, height: u16);

    /// Plugin is being removed; release everything
    fn stop(&self);

    /// Called on every main loop iteration, visible or not
    fn process(&self);

    /// Plugin becomes visible
    fn active(&self, _gfx: &mut dyn RenderSurface) {}

    /// Plugin is no longer visible
    fn inactive(&self) {}

    /// Copy the current content into the surface
    ///
    /// Must not perform any I/O. Calling it twice without a state change in
    /// between renders the same content.
    fn update(&self, gfx: &mut dyn RenderSurface);
}
