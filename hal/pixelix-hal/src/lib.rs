//! Pixelix platform abstraction layer
//!
//! This crate defines the traits the plugin runtime expects from the
//! platform it runs on. Board support code (ESP32 with an async HTTP client,
//! a host simulator, test doubles) implements them, and the plugin logic in
//! `pixelix-core` stays unaware of which one it talks to.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Plugins + slot rotation (pixelix-core) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixelix-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board HTTP / │       │  frame buffer │
//! │  clock / fs   │       │  (displays/)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`http::HttpClient`], [`http::HttpListener`] - Non-blocking HTTP requests
//! - [`clock::Clock`], [`clock::WallClock`] - Monotonic and calendar time
//! - [`storage::ConfigStore`] - Persistent plugin configuration
//! - [`gfx::RenderSurface`] - What a plugin may draw into

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gfx;
pub mod http;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, DateTime, WallClock};
pub use gfx::{Color, Icon, RenderSurface};
pub use http::{HttpClient, HttpListener, TransportError};
pub use storage::{ConfigStore, StorageError};
