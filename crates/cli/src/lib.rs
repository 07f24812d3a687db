use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "possim")]
#[command(about = "Synthetic trading-position feeder for a time-series store")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start one bot per instrument and feed positions until Ctrl+C
    Start {
        /// Path to the configuration file (built-in defaults are used if it does not exist)
        #[arg(short, long, default_value = "master_config/simulator.yaml")]
        config: PathBuf,

        /// Override the ingestion base URL
        #[arg(long, env = "POSSIM_BASE_URL")]
        base_url: Option<String>,

        /// Override the instrument list (comma separated)
        #[arg(long, value_delimiter = ',')]
        instruments: Option<Vec<String>>,

        /// Override the number of buy/sell pairs per round
        #[arg(long)]
        positions_per_round: Option<u32>,

        /// Override the log format (pretty, json, compact)
        #[arg(long)]
        log_format: Option<String>,
    },

    /// Validate configuration without starting any bot
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/simulator.yaml")]
        config: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "simulator.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_overrides() {
        let cli = Cli::try_parse_from([
            "possim",
            "start",
            "--instruments",
            "EURUSD,XAUUSD",
            "--positions-per-round",
            "1",
            "--base-url",
            "http://questdb:9000",
        ])
        .unwrap();

        match cli.command {
            Commands::Start {
                config,
                base_url,
                instruments,
                positions_per_round,
                log_format,
            } => {
                assert_eq!(config, PathBuf::from("master_config/simulator.yaml"));
                assert_eq!(base_url.as_deref(), Some("http://questdb:9000"));
                assert_eq!(
                    instruments,
                    Some(vec!["EURUSD".to_string(), "XAUUSD".to_string()])
                );
                assert_eq!(positions_per_round, Some(1));
                assert!(log_format.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_init_default_output() {
        let cli = Cli::try_parse_from(["possim", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Init { output } if output == PathBuf::from("simulator.yaml")
        ));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
