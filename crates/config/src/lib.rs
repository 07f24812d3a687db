use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Where and how positions are delivered
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sub-path of the query endpoint, appended to `base_url`
    #[serde(default = "default_exec_path")]
    pub exec_path: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Per-request timeout. Unset means the HTTP client's own default.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            exec_path: default_exec_path(),
            table: default_table(),
            request_timeout_ms: None,
        }
    }
}

impl IngestionConfig {
    /// Full URL of the query endpoint
    pub fn exec_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.exec_path)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Which instruments get a bot and how much each one produces
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,
    /// Buy/sell pairs sent per round, per instrument
    #[serde(default = "default_positions_per_round")]
    pub positions_per_round: u32,
    /// Base seed for the position generators. Worker `i` uses `seed + i`.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
            positions_per_round: default_positions_per_round(),
            seed: None,
        }
    }
}

impl BotConfig {
    /// Positions produced by all bots in one round
    pub fn positions_per_cycle(&self) -> usize {
        self.instruments.len() * self.positions_per_round as usize * 2
    }
}

/// Pacing of the bots, all values in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CadenceConfig {
    /// Pause after every single send
    #[serde(default = "default_trade_pause_ms")]
    pub trade_pause_ms: u64,
    /// Pause at the end of each round
    #[serde(default = "default_round_pause_ms")]
    pub round_pause_ms: u64,
    /// Delay between starting successive bots
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Pause taken by the client after a connection failure
    #[serde(default = "default_connection_backoff_ms")]
    pub connection_backoff_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            trade_pause_ms: default_trade_pause_ms(),
            round_pause_ms: default_round_pause_ms(),
            stagger_ms: default_stagger_ms(),
            connection_backoff_ms: default_connection_backoff_ms(),
        }
    }
}

impl CadenceConfig {
    pub fn trade_pause(&self) -> Duration {
        Duration::from_millis(self.trade_pause_ms)
    }

    pub fn round_pause(&self) -> Duration {
        Duration::from_millis(self.round_pause_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn connection_backoff(&self) -> Duration {
        Duration::from_millis(self.connection_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    /// How long to wait for workers to stop before aborting them
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// One of `pretty`, `json`, `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

/// Top-level simulator configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}
