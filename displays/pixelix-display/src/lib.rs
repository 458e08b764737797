//! Frame buffer for Pixelix plugin output
//!
//! Plugins describe their content through the `RenderSurface` trait. The
//! [`Frame`] in this crate records that description so the display manager
//! can decide whether the LED matrix has to be redrawn, and so the content
//! can be inspected on the host.

#![no_std]

pub mod frame;

pub use frame::{Frame, MAX_LAMPS, TEXT_LEN};
