// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! simbridge - drive simulated robot devices through pluggable adapters.
//!
//! This is the binary entry point.

mod check;
mod plugins;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simbridge_config::{ConfigError, SimbridgeConfig};

/// simbridge - drive simulated robot devices through pluggable adapters.
#[derive(Parser, Debug)]
#[command(name = "simbridge", version, about, long_about = None)]
struct Cli {
    /// Configuration file, replacing the standard lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the driver against the headless virtual engine until Ctrl+C.
    Run,
    /// Parse a robot description and print its device and plugin configuration.
    Check {
        /// Robot description file.
        description: PathBuf,
    },
    /// List built-in plugins and discovered native plugins.
    Plugins {
        /// Filter by name or description.
        query: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SimbridgeConfig, Vec<ConfigError>> {
    match path {
        Some(path) => simbridge_config::load_and_validate_path(path),
        None => simbridge_config::load_and_validate(),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            simbridge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    run::init_tracing(&config.driver.log_level);

    let result = match cli.command {
        Commands::Run => run::run_driver(&config),
        Commands::Check { description } => check::run_check(&description),
        Commands::Plugins { query } => {
            plugins::run_plugins(&config.plugins, query.as_deref().unwrap_or(""));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("simbridge: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = load_config(None).expect("default config should be valid");
        assert!(!config.driver.name.is_empty());
    }

    #[test]
    fn run_accepts_a_config_path() {
        let cli = Cli::try_parse_from(["simbridge", "run", "--config", "rover.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
        assert_eq!(cli.config, Some(PathBuf::from("rover.toml")));
    }

    #[test]
    fn check_requires_a_description() {
        assert!(Cli::try_parse_from(["simbridge", "check"]).is_err());
        let cli = Cli::try_parse_from(["simbridge", "check", "rover.urdf"]).unwrap();
        assert!(
            matches!(cli.command, Commands::Check { description } if description == PathBuf::from("rover.urdf"))
        );
    }

    #[test]
    fn plugins_query_is_optional() {
        let cli = Cli::try_parse_from(["simbridge", "plugins"]).unwrap();
        assert!(matches!(cli.command, Commands::Plugins { query: None }));
        let cli = Cli::try_parse_from(["simbridge", "plugins", "lidar"]).unwrap();
        assert!(matches!(cli.command, Commands::Plugins { query: Some(q) } if q == "lidar"));
    }
}
