//! `fishvault search`: find credentials by text.

use crate::cli::output;
use crate::cli::{unlock_vault, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub async fn execute(cli: &Cli, query: &str) -> Result<()> {
    let (_, vault) = unlock_vault(cli).await?;

    let found = vault.search_text(query).await?;
    vault.lock().await;

    if found.is_empty() {
        output::info(&format!("No items match '{query}'."));
        return Ok(());
    }

    output::info(&format!("{} item(s) match '{query}'", found.len()));
    output::print_decrypted_table(&found);
    Ok(())
}
