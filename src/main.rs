// Binary entry point - import modules directly
mod auth;
mod autodl;
mod cli;
mod commands;
mod config;
mod models;
mod remote;
mod sync;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::Config;
use utils::error::{AppError, report_error};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ensure configuration exists and load it
    if cli.config.is_none() {
        Config::ensure_config_exists()?;
    }

    let config = if let Some(config_path) = &cli.config {
        Config::load_custom(config_path)?
    } else {
        Config::load()?
    };

    // Execute command
    if let Err(err) = cli.command.execute(config).await {
        if let Some(app_err) = err.downcast_ref::<AppError>() {
            report_error(app_err);
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}
