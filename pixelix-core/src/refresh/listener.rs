//! Worker-side half of a refresh
//!
//! A [`RefreshListener`] is what a plugin registers with its HTTP client. It
//! holds nothing but a reference to the plugin's task proxy, so the worker
//! context has no way to reach plugin state.

use core::marker::PhantomData;

use alloc::boxed::Box;
use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, warn};
use pixelix_hal::HttpListener;
use serde::de::DeserializeOwned;

use super::{Msg, RefreshError};
use crate::task_proxy::TaskProxy;

/// Reasons a payload was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not valid JSON, or truncated
    Syntax,
    /// Valid JSON, but a field of interest is missing or has the wrong type
    Schema,
    /// Fields are present but their values make no sense
    InvalidValue,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() {
            ParseError::Schema
        } else {
            ParseError::Syntax
        }
    }
}

/// Deserialize a JSON payload into a filter type
///
/// The filter type names only the fields of interest; everything else in
/// the payload is skipped without being stored.
pub fn parse_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ParseError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Turns a raw payload into the value a plugin consumes
pub trait ResponseParser {
    /// Parse result handed to the main loop
    type Output: Send;

    /// Parse and validate a raw payload
    fn parse(payload: &[u8]) -> Result<Self::Output, ParseError>;
}

/// Listener forwarding transport callbacks into a task proxy
pub struct RefreshListener<'a, M: RawMutex, P: ResponseParser, const N: usize> {
    proxy: &'a TaskProxy<M, Msg<P::Output>, N>,
    _parser: PhantomData<fn() -> P>,
}

impl<M: RawMutex, P: ResponseParser, const N: usize> Clone for RefreshListener<'_, M, P, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, P: ResponseParser, const N: usize> Copy for RefreshListener<'_, M, P, N> {}

impl<'a, M: RawMutex, P: ResponseParser, const N: usize> RefreshListener<'a, M, P, N> {
    /// Create a listener feeding `proxy`
    pub const fn new(proxy: &'a TaskProxy<M, Msg<P::Output>, N>) -> Self {
        Self {
            proxy,
            _parser: PhantomData,
        }
    }

    /// Parse a payload and hand it over to the main loop
    ///
    /// On a parse failure nothing is enqueued. If the proxy is full, the
    /// parse result is released right here; the next refresh supersedes it.
    pub fn handle_response(&self, payload: &[u8]) -> Result<(), RefreshError> {
        let parsed = P::parse(payload).map_err(|e| {
            warn!("Invalid response received: {:?}", e);
            RefreshError::from(e)
        })?;

        self.proxy
            .send(Msg::Response(Box::new(parsed)))
            .map_err(|_dropped| {
                debug!("Task proxy full, response dropped.");
                RefreshError::QueueFull
            })
    }

    /// Forward a closed/error notification
    pub fn notify(&self, msg: Msg<P::Output>) -> Result<(), RefreshError> {
        self.proxy.send(msg).map_err(|_| {
            debug!("Task proxy full, notification dropped.");
            RefreshError::QueueFull
        })
    }
}

impl<M, P, const N: usize> HttpListener for RefreshListener<'_, M, P, N>
where
    M: RawMutex + Sync,
    P: ResponseParser,
{
    fn on_response(&self, payload: &[u8]) {
        let _ = self.handle_response(payload);
    }

    fn on_closed(&self) {
        let _ = self.notify(Msg::Closed);
    }

    fn on_error(&self) {
        warn!("Connection error happened.");
        let _ = self.notify(Msg::Error);
    }
}
