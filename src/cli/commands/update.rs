//! `fishvault update`: change fields of an existing credential.

use crate::cli::output;
use crate::cli::{read_secret, resolve_item_id, unlock_vault, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::generate_password;

/// Fields to change.  `None` leaves a field as it is.
pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub category: Option<&'a str>,
    pub new_secret: bool,
    pub generate: bool,
}

impl UpdateArgs<'_> {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.category.is_none()
            && !self.new_secret
            && !self.generate
    }
}

/// Execute the `update` command.
pub async fn execute(cli: &Cli, id: &str, args: UpdateArgs<'_>) -> Result<()> {
    if args.is_empty() {
        return Err(VaultError::InvalidInput(
            "nothing to update, pass at least one field flag".into(),
        ));
    }

    let (settings, vault) = unlock_vault(cli).await?;

    // 1. Find and decrypt the current record.
    let items = vault.list_items().await?;
    let id = resolve_item_id(items.iter().map(|i| i.id.as_str()), id)?;
    let mut record = vault.get_item(&id).await?.record.clone();

    // 2. Apply the requested changes.  An empty string clears an optional field.
    if let Some(title) = args.title {
        record.title = title.to_string();
    }
    if let Some(username) = args.username {
        record.username = username.to_string();
    }
    if let Some(url) = args.url {
        record.website_url = Some(url.to_string()).filter(|s| !s.is_empty());
    }
    if let Some(notes) = args.notes {
        record.notes = Some(notes.to_string()).filter(|s| !s.is_empty());
    }
    if let Some(category) = args.category {
        record.category = Some(category.to_string()).filter(|s| !s.is_empty());
    }
    if args.generate {
        record.secret = generate_password(settings.generator_length)?.to_string();
    } else if args.new_secret {
        record.secret = read_secret(&format!("New secret for {}", record.title))?.to_string();
    }

    // 3. Re-encrypt and store.
    vault.update_item(&id, &record).await?;
    vault.lock().await;

    output::success(&format!("Updated '{}'", record.title));
    Ok(())
}
