use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cal2cat_cli::commands::{conflicts, init, report};
use cal2cat_cli::{Cli, Commands, Config, ReportArgs};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays clean for the report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        // Init writes the config, so it must not require one to load
        Some(Commands::Init { force }) => init::run(&mut stdout, cli.config.as_deref(), *force)?,
        Some(Commands::Report(args)) => {
            let config = load_config(cli.config.as_deref())?;
            report::run(&mut stdout, &config, args)?;
        }
        Some(Commands::Conflicts { window }) => {
            let config = load_config(cli.config.as_deref())?;
            conflicts::run(&mut stdout, &config, window)?;
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            report::run(&mut stdout, &config, &ReportArgs::default())?;
        }
    }

    Ok(())
}
