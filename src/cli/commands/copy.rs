//! `fishvault copy`: put a credential's secret on the clipboard.
//!
//! The process stays alive until the clear timer fires so the secret does
//! not outlive its window.

use std::sync::Arc;

use crate::cli::output;
use crate::cli::{resolve_item_id, unlock_vault, Cli};
use crate::clipboard::{ClipboardGuard, SystemClipboard};
use crate::errors::Result;

/// Execute the `copy` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let (settings, vault) = unlock_vault(cli).await?;

    let items = vault.list_items().await?;
    let id = resolve_item_id(items.iter().map(|i| i.id.as_str()), id)?;
    let item = vault.get_item(&id).await?;
    vault.lock().await;

    let guard = ClipboardGuard::new(Arc::new(SystemClipboard::new()?), settings.clipboard_clear());
    guard.copy(&item.record.secret)?;
    drop(item);

    output::success(&format!(
        "Copied secret to clipboard. It will be cleared in {} seconds.",
        guard.clear_after().as_secs()
    ));
    guard.wait().await
}
