//! Collector configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `BOTWATCH_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::path::Path;
use std::time::Duration;

use botwatch_types::parse_duration;
use config::{Config, Environment, File};

use crate::ServerError;

/// Default address the collector listens on.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Number of history snapshots kept for the throughput-over-time chart.
pub const DEFAULT_MAX_HISTORY_ENTRIES: usize = 100;

/// Bots silent for longer than this are left out of responses.
pub const DEFAULT_ACTIVE_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the stats collector.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8000")
    pub listen_addr: String,
    /// Maximum number of history snapshots retained
    pub max_history_entries: usize,
    /// How long a bot counts as active after its last report
    pub active_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_history_entries: DEFAULT_MAX_HISTORY_ENTRIES,
            active_timeout: DEFAULT_ACTIVE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for ServerConfig.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from defaults, an optional file and the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let mut builder = Config::builder()
            .set_default("listen_addr", DEFAULT_LISTEN_ADDR)?
            .set_default("max_history_entries", DEFAULT_MAX_HISTORY_ENTRIES as i64)?
            .set_default("active_timeout", "15s")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder.add_source(Environment::with_prefix("BOTWATCH")).build()?;
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ServerError> {
        let listen_addr = settings.get_string("listen_addr")?;

        let max_history_entries = settings.get_int("max_history_entries")?;
        if max_history_entries < 1 {
            return Err(ServerError::InvalidValue {
                key: "max_history_entries",
                reason: format!("must be at least 1, got {}", max_history_entries),
            });
        }

        let active_timeout = parse_duration(&settings.get_string("active_timeout")?)?;

        Ok(Self {
            listen_addr,
            max_history_entries: max_history_entries as usize,
            active_timeout,
        })
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    max_history_entries: Option<usize>,
    active_timeout: Option<Duration>,
}

impl ServerConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the history cap.
    pub fn max_history_entries(mut self, entries: usize) -> Self {
        self.max_history_entries = Some(entries);
        self
    }

    /// Set the activity timeout.
    pub fn active_timeout(mut self, timeout: Duration) -> Self {
        self.active_timeout = Some(timeout);
        self
    }

    /// Build the ServerConfig.
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            listen_addr: self
                .listen_addr
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            max_history_entries: self
                .max_history_entries
                .unwrap_or(DEFAULT_MAX_HISTORY_ENTRIES)
                .max(1),
            active_timeout: self.active_timeout.unwrap_or(DEFAULT_ACTIVE_TIMEOUT),
        }
    }
}
