//! Needle CLI - electoral-vote outcome distributions from the command line
//!
//! # Commands
//!
//! - `needle pmf [forecast.toml]` - Vote-total distributions and win probabilities
//! - `needle scenario [forecast.toml] --win ID --lose ID` - Joint probability of pinned outcomes
//! - `needle regions [forecast.toml]` - Region table with derived model parameters
//!
//! Without a forecast file the built-in battleground map is used.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;

pub use error::{CliError, Result};

/// Correlated Monte-Carlo electoral forecast engine
#[derive(Parser)]
#[command(name = "needle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute vote-total distributions and win probabilities
    Pmf {
        /// Forecast file (TOML); defaults to the battleground map
        forecast: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Generator seed, overriding the file
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Evaluate the joint probability of pinned regional outcomes
    Scenario {
        /// Forecast file (TOML); defaults to the battleground map
        forecast: Option<PathBuf>,

        /// Region carried by the second party (repeatable)
        #[arg(short, long = "win", value_name = "ID")]
        win: Vec<String>,

        /// Region carried by the first party (repeatable)
        #[arg(short, long = "lose", value_name = "ID")]
        lose: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Generator seed, overriding the file
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List regions with their derived model parameters
    Regions {
        /// Forecast file (TOML); defaults to the battleground map
        forecast: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    debug!("Verbose mode enabled");

    match cli.command {
        Commands::Pmf {
            forecast,
            format,
            seed,
        } => commands::pmf::run(forecast.as_deref(), format, seed),
        Commands::Scenario {
            forecast,
            win,
            lose,
            format,
            seed,
        } => commands::scenario::run(forecast.as_deref(), &win, &lose, format, seed),
        Commands::Regions { forecast, format } => commands::regions::run(forecast.as_deref(), format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scenario_flags() {
        let cli = Cli::try_parse_from([
            "needle", "scenario", "map.toml", "--win", "PA", "-w", "GA", "--lose", "TX", "--seed", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Scenario {
                forecast,
                win,
                lose,
                format,
                seed,
            } => {
                assert_eq!(forecast, Some(PathBuf::from("map.toml")));
                assert_eq!(win, vec!["PA", "GA"]);
                assert_eq!(lose, vec!["TX"]);
                assert_eq!(format, OutputFormat::Table);
                assert_eq!(seed, Some(3));
            }
            _ => panic!("expected scenario"),
        }
    }

    #[test]
    fn test_parse_pmf_defaults() {
        let cli = Cli::try_parse_from(["needle", "-v", "pmf", "--format", "json"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Pmf {
                forecast: None,
                format: OutputFormat::Json,
                seed: None
            }
        ));
    }
}
