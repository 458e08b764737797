//! Board-agnostic plugin runtime for the Pixelix LED matrix display
//!
//! This crate contains everything between the platform traits in
//! `pixelix-hal` and what ends up on the matrix:
//!
//! - Software timers driven by an injected clock
//! - The task proxy, a bounded mailbox from network callbacks to the main loop
//! - The refresh cycle shared by all network-backed plugins
//! - Lock-guarded plugin state and the `Plugin` lifecycle trait
//! - The plugins themselves (BTC quote, Volumio, date/time)
//! - Slot rotation driving the plugin lifecycle
//!
//! Two execution contexts exist at runtime. The main loop calls the plugin
//! lifecycle methods one after another. The HTTP transport calls listeners
//! from its own worker context. The only object both contexts touch is the
//! task proxy of a plugin.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod plugin;
pub mod plugins;
pub mod refresh;
pub mod slots;
pub mod task_proxy;
pub mod text;
pub mod timer;

#[cfg(test)]
mod testing;

pub use plugin::{Plugin, PluginState};
pub use refresh::{Msg, RefreshCycle, RefreshError, RefreshListener, ResponseParser};
pub use slots::SlotManager;
pub use task_proxy::TaskProxy;
pub use timer::Timer;
