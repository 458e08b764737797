//! Plugin implementations
//!
//! - [`btc_quote`] - Bitcoin/USD exchange rate from the CoinDesk API
//! - [`volumio`] - Play state and title of a Volumio media player
//! - [`date_time`] - Local date and time with a weekday indicator

pub mod btc_quote;
pub mod date_time;
pub mod volumio;

pub use btc_quote::BtcQuotePlugin;
pub use date_time::DateTimePlugin;
pub use volumio::VolumioPlugin;

/// Text shown while no valid data is available
pub const FALLBACK_TEXT: &str = "?";
