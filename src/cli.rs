use crate::commands::{configure, revoke, sync};
use crate::config::Config;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autodl-sync")]
#[command(about = "Keeps an autodl-irssi filter file in sync with a Trakt watchlist")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config) -> Result<()> {
        match self {
            Commands::Sync(args) => {
                sync::handle_sync_command(config, &args).await?;
            }
            Commands::Revoke => {
                revoke::handle_revoke_command(config).await?;
            }
            Commands::Config(args) => {
                configure::handle_config_command(config, args.command.clone())?;
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the Trakt watchlist and append missing filters to the autodl file
    Sync(SyncArgs),

    /// Revoke the current Trakt authorization
    Revoke,

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct SyncArgs {
    #[arg(short = 'f', long, value_name = "FILE", help = "Autodl filter file to update (overrides config)")]
    pub file: Option<PathBuf>,

    #[arg(short = 'w', long, value_name = "DIR", help = "upload-watch-dir written into new filter blocks (overrides config)")]
    pub watch_dir: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_args_parse_overrides() {
        let cli = Cli::parse_from([
            "autodl-sync",
            "sync",
            "--file",
            "/srv/autodl/autodl.cfg",
            "--watch-dir",
            "/downloads/watch/",
        ]);

        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(
                    args.file.as_deref(),
                    Some(std::path::Path::new("/srv/autodl/autodl.cfg"))
                );
                assert_eq!(args.watch_dir.as_deref(), Some("/downloads/watch/"));
            }
            _ => panic!("expected sync subcommand"),
        }
    }

    #[test]
    fn test_global_config_override_parses() {
        let cli = Cli::parse_from(["autodl-sync", "--config", "/tmp/custom.toml", "revoke"]);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/custom.toml"))
        );
        assert!(matches!(cli.command, Commands::Revoke));
    }
}
