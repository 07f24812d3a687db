//! Position simulator binary
//!
//! Entry point for the `possim` command: start the bots, validate a
//! configuration file, or write a default one.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, SimulatorConfig,
};
use observability::{init_logging, init_metrics, LogFormat};
use simulator::{ShutdownController, Supervisor};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Overrides given on the `start` command line
#[derive(Debug, Default)]
struct StartOverrides {
    base_url: Option<String>,
    instruments: Option<Vec<String>>,
    positions_per_round: Option<u32>,
    log_format: Option<String>,
}

impl StartOverrides {
    fn apply(self, config: &mut SimulatorConfig) {
        if let Some(base_url) = self.base_url {
            config.ingestion.base_url = base_url;
        }
        if let Some(instruments) = self.instruments {
            config.bot.instruments = instruments
                .into_iter()
                .map(|s| s.trim().to_string())
                .collect();
        }
        if let Some(n) = self.positions_per_round {
            config.bot.positions_per_round = n;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            base_url,
            instruments,
            positions_per_round,
            log_format,
        } => {
            let overrides = StartOverrides {
                base_url,
                instruments,
                positions_per_round,
                log_format,
            };
            start_simulator(config, overrides).await
        }
        Commands::Validate { config } => {
            init_logging("possim", LogFormat::Pretty)?;
            validate_command(config)
        }
        Commands::Init { output } => {
            init_logging("possim", LogFormat::Pretty)?;
            init_command(output)
        }
    }
}

/// Load the file if it exists, otherwise fall back to built-in defaults
fn resolve_config(path: &Path) -> Result<(SimulatorConfig, bool)> {
    if path.exists() {
        Ok((load_config(path)?, false))
    } else {
        Ok((SimulatorConfig::default(), true))
    }
}

async fn start_simulator(config_path: impl AsRef<Path>, overrides: StartOverrides) -> Result<()> {
    let config_path = config_path.as_ref();
    let (mut config, using_defaults) = resolve_config(config_path)?;
    overrides.apply(&mut config);

    let format = LogFormat::parse(&config.logging.format).unwrap_or_default();
    init_logging("possim", format)?;

    if using_defaults {
        info!(path = ?config_path, "Config file not found, using built-in defaults");
    }
    debug!(?config, "Effective configuration");

    let report = validate_config(&config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start simulator due to configuration errors");
    }

    if let Some(metrics) = config.metrics.as_ref().filter(|m| m.enabled) {
        init_metrics(metrics.port).context("Failed to start metrics exporter")?;
    }

    let mut supervisor = Supervisor::http(config).with_shutdown(ShutdownController::with_ctrl_c());
    let drain = supervisor.run_until_shutdown().await?;

    if !drain.is_clean() {
        warn!(aborted = ?drain.aborted, "Some bots were aborted during shutdown");
    }
    for (symbol, stats) in &drain.stats {
        info!(
            symbol = %symbol,
            rounds = stats.rounds_completed,
            attempts = stats.attempts,
            successes = stats.successes,
            lost = stats.lost(),
            "Final bot statistics"
        );
    }

    Ok(())
}

fn validate_command(config_path: impl AsRef<Path>) -> Result<()> {
    let config_path = config_path.as_ref();
    info!(path = ?config_path, "Validating configuration");

    let config = load_config(config_path)?;
    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Endpoint: {}", config.ingestion.exec_url());
    println!("Table: {}", config.ingestion.table);
    println!("Instruments: {}", config.bot.instruments.join(", "));
    println!("Positions per round: {}", config.bot.positions_per_round);
    println!(
        "Positions per cycle (all bots): {}",
        config.bot.positions_per_cycle()
    );

    Ok(())
}

fn init_command(output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Point ingestion.base_url at your store");
    println!("  2. Create the positions table before starting the bots");
    println!(
        "  3. Run 'possim validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  4. Run 'possim start --config {:?}' to start feeding positions",
        output_path
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = SimulatorConfig::default();
        StartOverrides {
            base_url: Some("http://questdb:9000".to_string()),
            instruments: Some(vec!["EURUSD".to_string(), " XAUUSD ".to_string()]),
            positions_per_round: Some(1),
            log_format: Some("json".to_string()),
        }
        .apply(&mut config);

        assert_eq!(config.ingestion.base_url, "http://questdb:9000");
        assert_eq!(config.bot.instruments, vec!["EURUSD", "XAUUSD"]);
        assert_eq!(config.bot.positions_per_round, 1);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = SimulatorConfig::default();
        StartOverrides::default().apply(&mut config);

        assert_eq!(config.bot.instruments, vec!["EURUSD", "XAUUSD", "GBPUSD"]);
        assert_eq!(config.bot.positions_per_round, 3);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let (config, using_defaults) =
            resolve_config(Path::new("/nonexistent/possim/simulator.yaml")).unwrap();
        assert!(using_defaults);
        assert_eq!(config.ingestion.exec_url(), "http://localhost:9000/exec");
    }
}
