//! Game constants and client configuration.

use core::time::Duration;

use crate::common::ConfigError;

/// Width and height of both grids.
pub const GRID_SIZE: usize = 10;
/// Number of airplanes each player places.
pub const MAX_AIRPLANES: usize = 3;
/// Head hits that end the match.
pub const HEADS_TO_WIN: u32 = 3;
/// Cells covered by one airplane.
pub const AIRPLANE_CELLS: usize = 10;
/// Colour the server treats as an empty own-grid cell.
pub const EMPTY_CELL: [u8; 3] = [255, 255, 255];
/// Fixed wait between a dropped connection and the next attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);
/// Path of the game socket on the serving host.
pub const WS_PATH: &str = "/ws";

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Identity supplied by the menu before a match starts.
///
/// Both values are opaque to the engine; the only check is that neither is
/// blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    name: String,
    theme: String,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, theme: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let theme = theme.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if theme.trim().is_empty() {
            return Err(ConfigError::EmptyTheme);
        }
        Ok(Self { name, theme })
    }

    /// Display name (callsign) of the local player.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cosmetic theme id, passed through untouched.
    pub fn theme(&self) -> &str {
        &self.theme
    }
}

/// Build the socket URL for `host`, choosing `wss` when the page is secure.
pub fn endpoint_url(host: &str, secure: bool) -> String {
    let scheme = if secure { "wss" } else { "ws" };
    format!("{}://{}{}", scheme, host.trim_end_matches('/'), WS_PATH)
}

/// Connection settings for [`crate::TransportClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub reconnect_delay: Duration,
    /// Capacity of the bounded event channel handed to the game loop.
    pub event_channel_capacity: usize,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_delay: RECONNECT_DELAY,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    /// Override the reconnect delay. Mostly useful in tests.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }
}
