//! Board and application configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use tracing::info;

use crate::board::{SortOptions, TimeDisplay};
use crate::domain::Query;
use crate::realtime::FeedSource;
use crate::store::ScheduleSource;

/// Env var naming the config file.
pub const CONFIG_PATH_VAR: &str = "DEPARTURE_BOARD_CONFIG";

/// Config file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "departure-board.json";

/// Env var holding the realtime feed API key.
pub const FEED_API_KEY_VAR: &str = "FEED_API_KEY";

/// Longest accepted grace period: one day.
pub const MAX_GRACE_MINS: i64 = 24 * 60;

/// Longest accepted lookahead: two weeks of service days.
pub const MAX_LOOKAHEAD_DAYS: u32 = 14;

/// Largest accepted derived-delay bound: one week.
pub const MAX_DELAY_HOURS: i64 = 7 * 24;

/// Longest accepted schedule reload period: one week.
pub const MAX_SCHEDULE_REFRESH_HOURS: u64 = 7 * 24;

/// Longest accepted broadcast or realtime polling period: one day.
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters for building each board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// How long after its effective time a departure stays on the board
    /// (minutes).
    pub grace_mins: i64,

    /// Number of service days to expand, starting today.
    pub lookahead_days: u32,

    /// Whether the board orders by scheduled or estimated time.
    pub time_display: TimeDisplay,

    /// Whether the terminus takes part in ordering.
    pub show_all_terminus: bool,

    /// Whether the stop name takes part in ordering.
    pub show_stop_names: bool,

    /// Seconds between broadcasts.
    pub broadcast_interval_secs: u64,

    /// Seconds between realtime feed fetches.
    pub realtime_interval_secs: u64,

    /// Hours between schedule reloads.
    pub schedule_refresh_hours: u64,

    /// Timestamp-derived delays beyond this many hours are discarded.
    pub max_delay_hours: i64,
}

impl BoardConfig {
    // The accessors saturate so an unvalidated config cannot panic.

    pub fn grace(&self) -> Duration {
        Duration::try_minutes(self.grace_mins).unwrap_or(Duration::MAX)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::try_hours(self.max_delay_hours).unwrap_or(Duration::MAX)
    }

    pub fn broadcast_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.broadcast_interval_secs)
    }

    pub fn realtime_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.realtime_interval_secs)
    }

    pub fn schedule_refresh(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.schedule_refresh_hours.saturating_mul(60 * 60))
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            time_display: self.time_display,
            by_stop_name: self.show_stop_names,
            by_terminus: self.show_all_terminus,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOOKAHEAD_DAYS).contains(&self.lookahead_days) {
            return Err(ConfigError::Invalid(format!(
                "lookahead_days must be between 1 and {MAX_LOOKAHEAD_DAYS}"
            )));
        }
        if !(0..=MAX_GRACE_MINS).contains(&self.grace_mins) {
            return Err(ConfigError::Invalid(format!(
                "grace_mins must be between 0 and {MAX_GRACE_MINS}"
            )));
        }
        if !(1..=MAX_DELAY_HOURS).contains(&self.max_delay_hours) {
            return Err(ConfigError::Invalid(format!(
                "max_delay_hours must be between 1 and {MAX_DELAY_HOURS}"
            )));
        }
        if !(1..=MAX_SCHEDULE_REFRESH_HOURS).contains(&self.schedule_refresh_hours) {
            return Err(ConfigError::Invalid(format!(
                "schedule_refresh_hours must be between 1 and {MAX_SCHEDULE_REFRESH_HOURS}"
            )));
        }
        for (name, secs) in [
            ("broadcast_interval_secs", self.broadcast_interval_secs),
            ("realtime_interval_secs", self.realtime_interval_secs),
        ] {
            if !(1..=MAX_INTERVAL_SECS).contains(&secs) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 1 and {MAX_INTERVAL_SECS}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            grace_mins: 5,
            lookahead_days: 2,
            time_display: TimeDisplay::Scheduled,
            show_all_terminus: true,
            show_stop_names: true,
            broadcast_interval_secs: 60,
            realtime_interval_secs: 30,
            schedule_refresh_hours: 6,
            max_delay_hours: 12,
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Everything the server needs at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub schedule: ScheduleSource,

    #[serde(default)]
    pub realtime: FeedSource,

    /// Watches registered at startup.
    #[serde(default)]
    pub queries: Vec<Query>,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl AppConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AppConfig = serde_json::from_str(&text).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.board.validate()?;

        info!(path = %path.display(), queries = config.queries.len(), "loaded config");
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_PATH_VAR`], or the default path.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load(Path::new(&path))
    }
}
