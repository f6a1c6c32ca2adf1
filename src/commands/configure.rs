use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::output::OutputStyle;
use crate::utils::print_warning;
use anyhow::Result;

pub fn handle_config_command(config: Config, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config),
        Some(ConfigCommands::Path) => handle_path_command(),
        Some(ConfigCommands::Reset) => handle_reset_command(),
        None => handle_config_help(),
    }
}

fn handle_show_command(config: &Config) -> Result<()> {
    OutputStyle::print_header("⚙️  Autodl-sync Configuration");

    println!("Trakt:");
    OutputStyle::print_field("Username", &config.trakt.username);
    OutputStyle::print_field(
        "Client ID",
        if config.trakt.client_id.is_empty() { "(not set)" } else { "✓" },
    );
    OutputStyle::print_field(
        "Client secret",
        if config.trakt.client_secret.is_empty() { "(not set)" } else { "✓" },
    );

    println!("Autodl:");
    OutputStyle::print_field("Config file", &config.autodl.config_file.display().to_string());
    OutputStyle::print_field("Token file", &config.autodl.token_file.display().to_string());

    println!("Filter profile:");
    OutputStyle::print_field("Match categories", &config.profile.match_categories);
    OutputStyle::print_field("Match sites", &config.profile.match_sites);
    OutputStyle::print_field("Min size", &config.profile.min_size);
    OutputStyle::print_field("Max size", &config.profile.max_size);
    OutputStyle::print_field("Resolutions", &config.profile.resolutions);
    OutputStyle::print_field("Upload type", &config.profile.upload_type);
    OutputStyle::print_field("Upload watch dir", &config.profile.upload_watch_dir);

    Ok(())
}

fn handle_path_command() -> Result<()> {
    println!("{}", Config::config_file_path().display());
    Ok(())
}

fn handle_reset_command() -> Result<()> {
    Config::default().save()?;
    print_warning("Configuration reset to defaults. Fill in the [trakt] section before the next sync.");
    Ok(())
}

fn handle_config_help() -> Result<()> {
    OutputStyle::print_header("⚙️  Configuration Management");
    println!("Available configuration commands:");
    println!("  autodl-sync config show    - Show current configuration");
    println!("  autodl-sync config path    - Print the configuration file path");
    println!("  autodl-sync config reset   - Reset configuration to defaults");
    println!();
    println!("Configuration file: {}", Config::config_file_path().display());
    Ok(())
}
