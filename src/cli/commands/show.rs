//! `fishvault show`: print every field of one credential.

use crate::cli::output;
use crate::cli::{resolve_item_id, unlock_vault, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub async fn execute(cli: &Cli, id: &str, reveal: bool) -> Result<()> {
    let (_, vault) = unlock_vault(cli).await?;

    let items = vault.list_items().await?;
    let id = resolve_item_id(items.iter().map(|i| i.id.as_str()), id)?;
    let item = vault.get_item(&id).await?;
    vault.lock().await;

    output::print_item(&item, reveal);
    if !reveal {
        output::tip("Use --reveal to print the secret, or `fishvault copy` to copy it.");
    }

    Ok(())
}
