//! HTTP transport abstractions
//!
//! The transport owns the connection and runs its callbacks on its own
//! execution context. Nothing registered here may reach into state owned by
//! the main loop; listeners are expected to hand results over through a
//! queue.

/// Reasons a request could not be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// A previous request on this client has not finished yet
    Busy,
    /// The URL could not be parsed or resolved
    InvalidUrl,
    /// No network connection available
    NotConnected,
}

/// Callbacks invoked by the transport from its worker context
///
/// Implementations must be cheap to call and must never block, since they
/// run on the network stack's own task. One request produces at most one
/// `on_response`, followed by `on_closed`. A failed request produces
/// `on_error`, usually followed by `on_closed`.
pub trait HttpListener: Send + Sync {
    /// A complete response body was received
    fn on_response(&self, payload: &[u8]);

    /// The connection was closed
    fn on_closed(&self);

    /// The connection failed
    fn on_error(&self);
}

/// Non-blocking HTTP client
///
/// `L` is the listener type the owner registers. Clients keep at most one
/// request in flight: `get` returns [`TransportError::Busy`] until the
/// previous request has been closed or failed.
///
/// Both methods take `&self`; implementations synchronize internally, so
/// callers never need to hold a lock of their own across a request.
pub trait HttpClient<L: HttpListener> {
    /// Register the listener that receives all further callbacks
    ///
    /// Registering again replaces the previous listener.
    fn register_listener(&self, listener: L);

    /// Start a GET request
    ///
    /// Returns as soon as the request has been accepted for dispatch; the
    /// outcome arrives later through the registered listener.
    fn get(&self, url: &str) -> Result<(), TransportError>;
}
