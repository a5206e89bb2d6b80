//! `fishvault add`: encrypt and store a new credential.

use crate::cli::output;
use crate::cli::{read_secret, unlock_vault, Cli};
use crate::errors::Result;
use crate::vault::{assess_strength, generate_password, Strength, VaultRecord};

/// Options collected from the command line.
pub struct AddArgs<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub category: Option<&'a str>,
    pub generate: bool,
}

/// Execute the `add` command.
pub async fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    let (settings, vault) = unlock_vault(cli).await?;

    // Secret comes from the generator, piped stdin, or a prompt.
    let secret = if args.generate {
        generate_password(settings.generator_length)?
    } else {
        read_secret(&format!("Secret for {}", args.title))?
    };

    let mut record = VaultRecord::new(args.title, args.username, secret.as_str());
    record.website_url = args.url.map(str::to_string);
    record.notes = args.notes.map(str::to_string);
    record.category = args.category.map(str::to_string);

    let id = vault.create_item(&record).await?;
    vault.lock().await;

    output::success(&format!("Added '{}' ({})", args.title, &id));
    if args.generate {
        output::info("Generated a random password. Use `fishvault copy` to retrieve it.");
    } else if assess_strength(&secret) == Strength::TooShort {
        output::warning("That secret is shorter than 8 characters.");
    }

    Ok(())
}
