//! `fishvault init`: create a new vault for the configured user.

use crate::cli::output;
use crate::cli::{load_settings, open_vault, prompt_new_password, Cli};
use crate::errors::Result;

/// Execute the `init` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    // 1. Resolve settings and the KDF before asking for anything.
    let settings = load_settings(cli)?;
    let params = settings.kdf_params()?;
    let vault = open_vault(&settings)?;

    // 2. Prompt for a new master password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Derive the key, write the profile and its canary.
    output::info(&format!(
        "Deriving key with {} (this takes a moment)...",
        params.algorithm_name()
    ));
    vault.signup(&password, params).await?;
    vault.lock().await;

    output::success(&format!(
        "Vault created for user '{}' at {}",
        settings.user,
        settings.data_file
    ));
    output::warning(
        "There is no password recovery. Forgetting the master password loses the vault.",
    );
    output::tip("Run `fishvault add <TITLE>` to add a credential.");
    output::tip("Run `fishvault list` to see all credentials.");

    Ok(())
}
