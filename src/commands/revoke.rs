use crate::auth::{CredentialManager, SystemClock, TokenStore};
use crate::config::Config;
use crate::remote::trakt::TraktApi;
use crate::utils::{print_success, print_warning};
use anyhow::{Context, Result};

pub async fn handle_revoke_command(config: Config) -> Result<()> {
    let store = TokenStore::new(&config.autodl.token_file);
    if !store.exists() {
        print_warning("No stored authorization to revoke.");
        return Ok(());
    }

    let api = TraktApi::new(&config.trakt.client_id, &config.trakt.client_secret)?;
    let manager = CredentialManager::acquire(api, store, &SystemClock)
        .await
        .context("Failed to establish Trakt authorization")?;

    manager
        .revoke()
        .await
        .context("Failed to revoke the Trakt authorization")?;

    print_success(&format!(
        "Authorization revoked. The token file {} was left in place; the next run refreshes or re-authorizes.",
        manager.token_store().path().display()
    ));

    Ok(())
}
