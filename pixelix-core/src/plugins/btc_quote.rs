//! Bitcoin quote plugin
//!
//! Shows the current BTC/USD exchange rate, e.g. `42'123.50 $/BTC`.

use alloc::format;
use alloc::string::{String, ToString};

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{info, warn};
use pixelix_hal::{Clock, Color, HttpClient, Icon, RenderSurface};
use serde::Deserialize;

use super::FALLBACK_TEXT;
use crate::plugin::{Plugin, PluginState};
use crate::refresh::{
    parse_json, Msg, ParseError, RefreshCycle, RefreshError, RefreshListener, ResponseParser,
};
use crate::task_proxy::TaskProxy;
use crate::text::substitute_group_separator;

/// Quote source
pub const QUOTE_URL: &str = "http://api.coindesk.com/v1/bpi/currentprice/USD.json";

/// Icon shown left of the quote
pub const ICON: Icon = Icon("/images/BTC_USD.bmp");

/// Refresh period after a successful request (ms)
pub const UPDATE_PERIOD_MS: u32 = 30 * 60 * 1000;

/// Retry period after a request could not be issued (ms)
pub const UPDATE_PERIOD_SHORT_MS: u32 = 10 * 1000;

/// Task proxy capacity
pub const QUEUE_SIZE: usize = 2;

/// Parsed quote
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    /// Rate as formatted by the API, e.g. `42,123.5000`
    pub rate: String,
    /// Rate as a number
    pub rate_float: f64,
}

#[derive(Deserialize)]
struct QuoteDocument {
    bpi: Bpi,
}

#[derive(Deserialize)]
struct Bpi {
    #[serde(rename = "USD")]
    usd: Quote,
}

/// Extracts `bpi.USD.rate` and `bpi.USD.rate_float`
pub struct QuoteParser;

impl ResponseParser for QuoteParser {
    type Output = Quote;

    fn parse(payload: &[u8]) -> Result<Quote, ParseError> {
        let document: QuoteDocument = parse_json(payload)?;
        let quote = document.bpi.usd;

        if !quote.rate_float.is_finite() || quote.rate.is_empty() {
            return Err(ParseError::InvalidValue);
        }

        Ok(quote)
    }
}

pub type QuoteMsg = Msg<Quote>;
pub type QuoteProxy<M> = TaskProxy<M, QuoteMsg, QUEUE_SIZE>;
pub type QuoteListener<'a, M> = RefreshListener<'a, M, QuoteParser, QUEUE_SIZE>;

struct QuoteState {
    refresh: RefreshCycle,
    /// Text shown on the display
    text: String,
    /// Last valid rate
    last_rate: Option<f64>,
}

impl QuoteState {
    fn apply(&mut self, msg: QuoteMsg) {
        match msg {
            Msg::Response(quote) => {
                self.text = format!("{} $/BTC", substitute_group_separator(&quote.rate));
                self.last_rate = Some(quote.rate_float);
                info!("BTC/USD to print {}", self.text.as_str());
            }
            Msg::Error => {}
            Msg::Closed => self.refresh.complete(),
        }
    }
}

/// BTC/USD quote plugin
pub struct BtcQuotePlugin<'a, M: RawMutex, C, K> {
    uid: u16,
    /// Driven by the main loop only, never under the state lock
    client: C,
    proxy: &'a QuoteProxy<M>,
    clock: &'a K,
    state: PluginState<M, QuoteState>,
}

impl<'a, M, C, K> BtcQuotePlugin<'a, M, C, K>
where
    M: RawMutex + Sync,
    C: HttpClient<QuoteListener<'a, M>>,
    K: Clock,
{
    /// Create the plugin
    ///
    /// `proxy` must outlive every callback the client may still fire, which
    /// the borrow guarantees as long as the client does not outlive `'a`.
    pub fn new(uid: u16, client: C, proxy: &'a QuoteProxy<M>, clock: &'a K) -> Self {
        Self {
            uid,
            client,
            proxy,
            clock,
            state: PluginState::new(QuoteState {
                refresh: RefreshCycle::new(UPDATE_PERIOD_MS, UPDATE_PERIOD_SHORT_MS),
                text: FALLBACK_TEXT.to_string(),
                last_rate: None,
            }),
        }
    }

    /// Last valid rate, if any was received yet
    pub fn last_rate(&self) -> Option<f64> {
        self.state.lock(|s| s.last_rate)
    }

    fn request(&self) -> Result<(), RefreshError> {
        match self.client.get(QUOTE_URL) {
            Ok(()) => {
                info!("GET {} success.", QUOTE_URL);
                Ok(())
            }
            Err(e) => {
                warn!("GET {} failed: {:?}", QUOTE_URL, e);
                Err(e.into())
            }
        }
    }

    /// Issue a request, unconditionally or only when the timer expired
    fn refresh(&self, now_ms: u64, due_only: bool) {
        let reserved = self.state.lock(|s| {
            if due_only && !s.refresh.is_due(now_ms) {
                None
            } else {
                Some(s.refresh.reserve(now_ms))
            }
        });

        if let Some(reserved) = reserved {
            let result = reserved.and_then(|()| self.request());
            let _ = self.state.lock(|s| s.refresh.record(now_ms, result));
        }
    }
}

impl<'a, M, C, K> Plugin for BtcQuotePlugin<'a, M, C, K>
where
    M: RawMutex + Sync,
    C: HttpClient<QuoteListener<'a, M>> + Sync,
    K: Clock,
{
    fn name(&self) -> &'static str {
        "BTCQuotePlugin"
    }

    fn uid(&self) -> u16 {
        self.uid
    }

    fn start(&self, _width: u16, _height: u16) {
        self.client.register_listener(QuoteListener::new(self.proxy));
        self.refresh(self.clock.now_ms(), false);
    }

    fn stop(&self) {
        self.state.lock(|s| s.refresh.stop());

        let discarded = self.proxy.clear();
        if discarded > 0 {
            info!("Discarded {} pending message(s).", discarded);
        }
    }

    fn process(&self) {
        self.refresh(self.clock.now_ms(), true);

        if let Some(msg) = self.proxy.receive() {
            self.state.lock(|s| s.apply(msg));
        }
    }

    fn update(&self, gfx: &mut dyn RenderSurface) {
        self.state.lock(|s| {
            gfx.fill_background(Color::BLACK);
            gfx.set_icon(Some(ICON));
            gfx.set_text(&s.text);
        });
    }
}
