//! `fishvault delete`: remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{resolve_item_id, unlock_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub async fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let (_, vault) = unlock_vault(cli).await?;

    let items = vault.list_items().await?;
    let id = resolve_item_id(items.iter().map(|i| i.id.as_str()), id)?;
    let title = items
        .iter()
        .find(|i| i.id == id)
        .and_then(|i| i.record.as_ref().ok())
        .map_or_else(|| id.clone(), |r| r.title.clone());

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            vault.lock().await;
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete_item(&id).await?;
    vault.lock().await;

    output::success(&format!("Deleted '{title}'"));
    Ok(())
}
