use crate::auth::{CredentialManager, SystemClock, TokenStore};
use crate::autodl::AutodlFile;
use crate::cli::SyncArgs;
use crate::config::Config;
use crate::remote::WatchlistSource;
use crate::remote::trakt::{TraktApi, TraktWatchlist};
use crate::sync::diff;
use crate::utils::{print_info, print_success, print_warning};
use anyhow::{Context, Result};

/// The full synchronization run: establish authorization, pull the
/// watchlist and collection, diff against the autodl file, append what is
/// missing. Any failure aborts the run; a re-run recomputes the remaining
/// difference, so there is nothing to roll back.
pub async fn handle_sync_command(mut config: Config, args: &SyncArgs) -> Result<()> {
    if let Some(file) = &args.file {
        if !file.exists() {
            print_warning(&format!(
                "Autodl file does not exist at {}. It will be created.",
                file.display()
            ));
        }
        config.autodl.config_file = file.clone();
    }
    if let Some(watch_dir) = &args.watch_dir {
        config.profile.upload_watch_dir = watch_dir.clone();
    }

    println!("🎬 Getting the Trakt client started up...");
    let api = TraktApi::new(&config.trakt.client_id, &config.trakt.client_secret)?;
    let manager = CredentialManager::acquire(
        api.clone(),
        TokenStore::new(&config.autodl.token_file),
        &SystemClock,
    )
    .await
    .context("Failed to establish Trakt authorization")?;

    println!("📥 Getting the list of movies from the Trakt watchlist...");
    let trakt = TraktWatchlist::new(api, &config.trakt.username, manager.access_token());
    let watchlist = trakt
        .fetch_watchlist()
        .await
        .context("Failed to fetch the Trakt watchlist")?;
    let collected = trakt
        .fetch_collected()
        .await
        .context("Failed to fetch the Trakt collection")?;

    println!(
        "📝 Updating the autodl config file {}...",
        config.autodl.config_file.display()
    );
    let autodl = AutodlFile::new(&config.autodl.config_file, config.profile.clone())?;
    autodl.ensure_exists()?;
    let present = autodl
        .read_entries()
        .context("Failed to read existing autodl entries")?;

    let net_new = diff(&watchlist, &collected, &present);
    if net_new.is_empty() {
        print_info("No new movies to be written to the autodl file.");
        return Ok(());
    }

    println!("Here are the movies to be written to the autodl file:");
    for movie in &net_new {
        println!("  {}", movie);
    }

    let written = autodl
        .append_entries(&net_new)
        .context("Failed to append entries to the autodl file")?;
    print_success(&format!(
        "Added {} movie(s) to {}",
        written.len(),
        autodl.path().display()
    ));

    Ok(())
}
