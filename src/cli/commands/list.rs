//! `fishvault list`: display all credentials in a table.

use crate::cli::output;
use crate::cli::{unlock_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let (settings, vault) = unlock_vault(cli).await?;

    let items = vault.list_items().await?;
    vault.lock().await;

    let unreadable = items.iter().filter(|i| i.record.is_err()).count();
    output::info(&format!("{}: {} item(s)", settings.user, items.len()));
    output::print_items_table(&items);

    if unreadable > 0 {
        output::warning(&format!(
            "{unreadable} item(s) could not be decrypted and were left untouched."
        ));
    }

    Ok(())
}
