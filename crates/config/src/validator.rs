use crate::*;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No instruments defined")]
    NoInstruments,

    #[error("Instrument at index {index} has an empty symbol")]
    EmptyInstrument { index: usize },

    #[error("Duplicate instrument '{0}'")]
    DuplicateInstrument(String),

    #[error("positions_per_round must be a positive integer")]
    InvalidPositionsPerRound,

    #[error("Invalid base_url '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("exec_path '{0}' must start with '/'")]
    InvalidExecPath(String),

    #[error("Invalid table name '{0}'. Must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidTableName(String),

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Environment variable placeholder in '{field}' was not resolved")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &SimulatorConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_ingestion(&config.ingestion, &mut report);
    validate_bot(&config.bot, &mut report);
    validate_cadence(&config.cadence, &mut report);
    validate_logging(&config.logging, &mut report);

    if config.shutdown.drain_timeout_ms == 0 {
        report.add_warning(
            "shutdown.drain_timeout_ms",
            "Workers will be aborted immediately on shutdown",
        );
    }

    match &config.metrics {
        Some(metrics) if metrics.enabled && metrics.port == 0 => {
            report.add_error(ValidationError::InvalidPositiveInteger {
                field: "metrics.port".to_string(),
            });
        }
        Some(_) => {}
        None => report.add_default("metrics.enabled", "false"),
    }

    report
}

fn validate_ingestion(ingestion: &IngestionConfig, report: &mut ValidationReport) {
    if has_unresolved_env_vars(&ingestion.base_url) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "ingestion.base_url".to_string(),
        });
    } else {
        match Url::parse(&ingestion.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => report.add_error(ValidationError::InvalidBaseUrl {
                url: ingestion.base_url.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => report.add_error(ValidationError::InvalidBaseUrl {
                url: ingestion.base_url.clone(),
                message: e.to_string(),
            }),
        }
    }

    if !ingestion.exec_path.starts_with('/') {
        report.add_error(ValidationError::InvalidExecPath(ingestion.exec_path.clone()));
    }

    let table_regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex");
    if !table_regex.is_match(&ingestion.table) {
        report.add_error(ValidationError::InvalidTableName(ingestion.table.clone()));
    }

    match ingestion.request_timeout_ms {
        None => report.add_warning(
            "ingestion.request_timeout_ms",
            "No request timeout; an unresponsive endpoint stalls its worker indefinitely",
        ),
        Some(0) => report.add_error(ValidationError::InvalidPositiveInteger {
            field: "ingestion.request_timeout_ms".to_string(),
        }),
        Some(_) => {}
    }
}

fn validate_bot(bot: &BotConfig, report: &mut ValidationReport) {
    if bot.instruments.is_empty() {
        report.add_error(ValidationError::NoInstruments);
    }

    let mut seen = HashSet::new();
    for (index, symbol) in bot.instruments.iter().enumerate() {
        if symbol.trim().is_empty() {
            report.add_error(ValidationError::EmptyInstrument { index });
            continue;
        }
        if has_unresolved_env_vars(symbol) {
            report.add_error(ValidationError::UnresolvedEnvVar {
                field: format!("bot.instruments[{}]", index),
            });
        }
        if !seen.insert(symbol.as_str()) {
            report.add_error(ValidationError::DuplicateInstrument(symbol.clone()));
        }
    }

    if bot.positions_per_round == 0 {
        report.add_error(ValidationError::InvalidPositionsPerRound);
    }

    if bot.seed.is_some() {
        report.add_warning(
            "bot.seed",
            "Generators are seeded; every run produces the same price sequence",
        );
    }
}

fn validate_cadence(cadence: &CadenceConfig, report: &mut ValidationReport) {
    if cadence.trade_pause_ms == 0 && cadence.round_pause_ms == 0 {
        report.add_warning(
            "cadence",
            "trade_pause_ms and round_pause_ms are both 0; bots will send in a tight loop",
        );
    }

    if cadence.connection_backoff_ms == 0 {
        report.add_warning(
            "cadence.connection_backoff_ms",
            "No backoff after connection failures; a down endpoint will be hammered",
        );
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    let valid_formats = ["pretty", "json", "compact"];
    if !valid_formats.contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}
