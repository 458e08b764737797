//! Asynchronous data refresh shared by all network-backed plugins
//!
//! A refresh runs through two execution contexts:
//!
//! ```text
//!  main loop                               transport worker
//!  ─────────                               ────────────────
//!  RefreshCycle::reserve ── timer expired ► HttpClient::get
//!  RefreshCycle::record  ◄─── issued? ──────────┤
//!                                               │
//!                                               ▼
//!                                    RefreshListener::on_response
//!                                        parse + validate
//!                                               │
//!  TaskProxy::receive ◄──── Msg::Response ──────┘
//!  lock plugin state, apply, drop box
//! ```
//!
//! The listener never sees plugin state, and the plugin lock is never taken
//! on the worker side. The only hand-over point is the task proxy.

pub mod cycle;
pub mod listener;

use alloc::boxed::Box;

use pixelix_hal::TransportError;

pub use cycle::{RefreshCycle, DEFAULT_REQUEST_TIMEOUT_MS};
pub use listener::{parse_json, ParseError, RefreshListener, ResponseParser};

/// Message passed from the transport worker to the main loop
///
/// `Response` owns the parse result. Whoever holds the message holds the
/// result; dropping the message releases it.
#[derive(Debug)]
pub enum Msg<R> {
    /// Parsed response payload
    Response(Box<R>),
    /// The connection of the current request was closed
    Closed,
    /// The current request failed on the transport level
    Error,
}

/// Local, non-fatal failures of a refresh
///
/// None of these leave the plugin; they are logged and either retried on the
/// short period or superseded by the next refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshError {
    /// The transport (or a still outstanding request) did not accept the request
    TransportBusy,
    /// The transport rejected the request for another reason
    Transport(TransportError),
    /// The plugin lacks configuration required to build the request
    NotConfigured,
    /// The payload failed parsing or schema validation
    MalformedResponse(ParseError),
    /// The task proxy was full, the response was dropped
    QueueFull,
}

impl From<TransportError> for RefreshError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Busy => RefreshError::TransportBusy,
            other => RefreshError::Transport(other),
        }
    }
}

impl From<ParseError> for RefreshError {
    fn from(e: ParseError) -> Self {
        RefreshError::MalformedResponse(e)
    }
}
