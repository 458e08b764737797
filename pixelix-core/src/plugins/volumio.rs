//! Volumio plugin
//!
//! Polls the state of a Volumio media player and shows the current title
//! together with a play/stop icon. The player's host name is configurable
//! and persisted per plugin instance.

use alloc::string::{String, ToString};
use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, info, warn};
use pixelix_hal::{Clock, Color, ConfigStore, HttpClient, Icon, RenderSurface};
use serde::{Deserialize, Serialize};

use super::FALLBACK_TEXT;
use crate::config::{self, ConfigError, MAX_PATH_LEN};
use crate::plugin::{Plugin, PluginState};
use crate::refresh::{
    parse_json, Msg, ParseError, RefreshCycle, RefreshError, RefreshListener, ResponseParser,
};
use crate::task_proxy::TaskProxy;

/// Icon while the player state is unknown
pub const ICON_STD: Icon = Icon("/images/volumio.bmp");

/// Icon while the player is stopped
pub const ICON_STOP: Icon = Icon("/images/volumioStop.bmp");

/// Icon while the player is playing
pub const ICON_PLAY: Icon = Icon("/images/volumioPlay.bmp");

/// Refresh period after a successful request (ms)
pub const UPDATE_PERIOD_MS: u32 = 2 * 1000;

/// Retry period after a failed request (ms)
pub const UPDATE_PERIOD_SHORT_MS: u32 = 10 * 1000;

/// Task proxy capacity
pub const QUEUE_SIZE: usize = 2;

/// Maximum host name length
pub const MAX_HOST_LEN: usize = 64;

/// Title shown if the player reports none
const EMPTY_TITLE: &str = "-";

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumioConfig {
    /// Host name or address of the Volumio player
    pub host: heapless::String<MAX_HOST_LEN>,
}

/// Player state as reported by `/api/v1/getState`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerState {
    pub status: String,
    pub title: String,
    pub seek: u32,
}

/// Extracts `status`, `title` and `seek`
pub struct PlayerStateParser;

impl ResponseParser for PlayerStateParser {
    type Output = PlayerState;

    fn parse(payload: &[u8]) -> Result<PlayerState, ParseError> {
        parse_json(payload)
    }
}

pub type VolumioMsg = Msg<PlayerState>;
pub type VolumioProxy<M> = TaskProxy<M, VolumioMsg, QUEUE_SIZE>;
pub type VolumioListener<'a, M> = RefreshListener<'a, M, PlayerStateParser, QUEUE_SIZE>;

struct VolumioState {
    refresh: RefreshCycle,
    host: heapless::String<MAX_HOST_LEN>,
    icon: Icon,
    text: String,
    /// Seek position of the last response
    last_seek: u32,
    /// Transport reported an error for the current request
    connection_error: bool,
}

impl VolumioState {
    fn show_fallback(&mut self) {
        self.icon = ICON_STD;
        self.text = FALLBACK_TEXT.to_string();
    }

    fn apply(&mut self, msg: VolumioMsg, now_ms: u64) {
        match msg {
            Msg::Response(state) => self.show_player_state(&state),
            Msg::Error => self.connection_error = true,
            Msg::Closed => {
                self.refresh.complete();
                if self.connection_error {
                    self.show_fallback();
                    self.refresh.retry_soon(now_ms);
                }
                self.connection_error = false;
            }
        }
    }

    fn show_player_state(&mut self, state: &PlayerState) {
        let mut status = state.status.as_str();

        // Volumio keeps reporting "stop" for a while after playback started,
        // a moving seek position tells the truth.
        if status == "stop" && self.last_seek != state.seek {
            status = "play";
        }
        self.last_seek = state.seek;

        self.icon = match status {
            "stop" => ICON_STOP,
            "play" => ICON_PLAY,
            _ => ICON_STD,
        };

        self.text = if state.title.is_empty() {
            EMPTY_TITLE.to_string()
        } else {
            state.title.clone()
        };
    }
}

/// Volumio media player plugin
pub struct VolumioPlugin<'a, M: RawMutex, C, K, S> {
    uid: u16,
    /// Driven by the main loop only, never under the state lock
    client: C,
    proxy: &'a VolumioProxy<M>,
    clock: &'a K,
    store: &'a S,
    config_path: heapless::String<MAX_PATH_LEN>,
    state: PluginState<M, VolumioState>,
}

impl<'a, M, C, K, S> VolumioPlugin<'a, M, C, K, S>
where
    M: RawMutex + Sync,
    C: HttpClient<VolumioListener<'a, M>>,
    K: Clock,
    S: ConfigStore,
{
    /// Create the plugin
    pub fn new(uid: u16, client: C, proxy: &'a VolumioProxy<M>, clock: &'a K, store: &'a S) -> Self {
        Self {
            uid,
            client,
            proxy,
            clock,
            store,
            config_path: config::config_path(uid),
            state: PluginState::new(VolumioState {
                refresh: RefreshCycle::new(UPDATE_PERIOD_MS, UPDATE_PERIOD_SHORT_MS),
                host: heapless::String::new(),
                icon: ICON_STD,
                text: FALLBACK_TEXT.to_string(),
                last_seek: 0,
                connection_error: false,
            }),
        }
    }

    /// Configured host
    pub fn host(&self) -> heapless::String<MAX_HOST_LEN> {
        self.state.lock(|s| s.host.clone())
    }

    /// Change the host and persist it
    ///
    /// Takes effect with the next request.
    pub fn set_host(&self, host: &str) -> Result<(), ConfigError> {
        let mut config = VolumioConfig::default();
        config
            .host
            .push_str(host)
            .map_err(|_| ConfigError::InvalidValue)?;

        self.state.lock(|s| s.host = config.host.clone());

        // File I/O stays outside the lock
        config::save(self.store, &self.config_path, &config)
    }

    fn request(&self, host: &str) -> Result<(), RefreshError> {
        if host.is_empty() {
            debug!("No Volumio host configured.");
            return Err(RefreshError::NotConfigured);
        }

        let mut url: heapless::String<{ MAX_HOST_LEN + 32 }> = heapless::String::new();
        write!(url, "http://{}/api/v1/getState", host)
            .map_err(|_| RefreshError::NotConfigured)?;

        self.client.get(&url).map_err(|e| {
            warn!("GET {} failed: {:?}", url.as_str(), e);
            RefreshError::from(e)
        })
    }

    /// Issue a request, unconditionally or only when the timer expired
    fn refresh(&self, now_ms: u64, due_only: bool) {
        let reserved = self.state.lock(|s| {
            if due_only && !s.refresh.is_due(now_ms) {
                None
            } else {
                Some(s.refresh.reserve(now_ms).map(|()| s.host.clone()))
            }
        });

        if let Some(reserved) = reserved {
            // A request of our own still outstanding is no reason to drop the shown state
            let issued = reserved.is_ok();
            let result = reserved.and_then(|host| self.request(&host));
            self.state.lock(|s| {
                if s.refresh.record(now_ms, result).is_err() && issued {
                    s.show_fallback();
                }
            });
        }
    }
}

impl<'a, M, C, K, S> Plugin for VolumioPlugin<'a, M, C, K, S>
where
    M: RawMutex + Sync,
    C: HttpClient<VolumioListener<'a, M>> + Sync,
    K: Clock,
    S: ConfigStore,
{
    fn name(&self) -> &'static str {
        "VolumioPlugin"
    }

    fn uid(&self) -> u16 {
        self.uid
    }

    fn start(&self, _width: u16, _height: u16) {
        let config: VolumioConfig = config::load_or_init(self.store, &self.config_path);

        self.state.lock(|s| s.host = config.host);
        self.client.register_listener(VolumioListener::new(self.proxy));
        self.refresh(self.clock.now_ms(), false);
    }

    fn stop(&self) {
        self.state.lock(|s| s.refresh.stop());

        let discarded = self.proxy.clear();
        if discarded > 0 {
            info!("Discarded {} pending message(s).", discarded);
        }

        config::remove(self.store, &self.config_path);
    }

    fn process(&self) {
        let now = self.clock.now_ms();

        self.refresh(now, true);

        if let Some(msg) = self.proxy.receive() {
            self.state.lock(|s| s.apply(msg, now));
        }
    }

    fn active(&self, gfx: &mut dyn RenderSurface) {
        self.update(gfx);
    }

    fn update(&self, gfx: &mut dyn RenderSurface) {
        self.state.lock(|s| {
            gfx.fill_background(Color::BLACK);
            gfx.set_icon(Some(s.icon));
            gfx.set_text(&s.text);
        });
    }
}
