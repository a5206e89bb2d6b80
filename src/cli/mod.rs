//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::session::SessionKeyManager;
use crate::storage::FileStorage;
use crate::vault::generator::MIN_MASTER_PASSWORD_LEN;
use crate::vault::VaultService;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "FISHVAULT_PASSWORD";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "FISHVAULT_LOG";

/// FishVault CLI: a zero-knowledge password vault.
#[derive(Parser)]
#[command(
    name = "fishvault",
    about = "Zero-knowledge password vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault user id (default: from .fishvault.toml, else "default")
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Store file (default: from .fishvault.toml, else .fishvault/store.json)
    #[arg(long, global = true)]
    pub data_file: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master password
    Init,

    /// Add a credential (secret read from stdin or an interactive prompt)
    Add {
        /// Title, e.g. "Gmail"
        title: String,
        /// Username or email for the account
        #[arg(short = 'n', long, default_value = "")]
        username: String,
        /// Website URL
        #[arg(long)]
        url: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Category (Login, Email, Social, Finance, Work, Shopping, Entertainment, Other)
        #[arg(short, long)]
        category: Option<String>,
        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,
    },

    /// List all credentials
    List,

    /// Show one credential
    Show {
        /// Item id (a unique prefix is enough)
        id: String,
        /// Print the secret instead of masking it
        #[arg(long)]
        reveal: bool,
    },

    /// Copy a credential's secret to the clipboard, clearing it afterwards
    Copy {
        /// Item id (a unique prefix is enough)
        id: String,
    },

    /// Change fields of a credential
    Update {
        /// Item id (a unique prefix is enough)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 'n', long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Read a new secret from stdin or an interactive prompt
        #[arg(long, conflicts_with = "generate")]
        new_secret: bool,
        /// Replace the secret with a generated password
        #[arg(short, long)]
        generate: bool,
    },

    /// Delete a credential
    Delete {
        /// Item id (a unique prefix is enough)
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Search credentials by title, username, website or category
    Search {
        /// Case-insensitive text to look for
        query: String,
    },

    /// Generate a random password (no vault needed)
    Generate {
        /// Password length (default: from .fishvault.toml, else 16)
        #[arg(short, long)]
        length: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber.
///
/// `FISHVAULT_LOG` takes a filter directive; `--verbose` forces `debug`.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("fishvault=debug,warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load `.fishvault.toml` from the working directory and apply CLI overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;

    if let Some(user) = &cli.user {
        settings.user = user.clone();
    }
    if let Some(data_file) = &cli.data_file {
        settings.data_file = data_file.clone();
    }
    settings.validate()?;

    Ok(settings)
}

/// Build a locked `VaultService` over the configured store file.
pub fn open_vault(settings: &Settings) -> Result<VaultService> {
    let cwd = std::env::current_dir()?;
    let storage = Arc::new(FileStorage::new(settings.data_path(&cwd)));
    let session = Arc::new(SessionKeyManager::new(settings.auto_lock()));
    Ok(VaultService::new(storage, session, settings.user.clone()))
}

/// Load settings, open the vault and unlock it with the master password.
pub async fn unlock_vault(cli: &Cli) -> Result<(Settings, VaultService)> {
    let settings = load_settings(cli)?;
    let vault = open_vault(&settings)?;

    let password = prompt_password()?;
    match vault.unlock(&password).await {
        Err(VaultError::ProfileNotFound(user)) => {
            output::tip("Run `fishvault init` to create a vault first.");
            Err(VaultError::ProfileNotFound(user))
        }
        other => other.map(|()| (settings, vault)),
    }
}

/// Get the master password, trying in order:
/// 1. `FISHVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `FISHVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose master password")
                .with_confirmation(
                    "Confirm master password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.chars().count() < MIN_MASTER_PASSWORD_LEN {
            output::warning(&format!(
                "Master password must be at least {MIN_MASTER_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        let strength = crate::vault::assess_strength(&password);
        output::info(&format!("Password strength: {}", strength.label()));
        return Ok(password);
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Read a credential secret from piped stdin, or prompt for it.
pub fn read_secret(prompt: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        return Ok(buf);
    }

    let secret = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Expand a (possibly abbreviated) item id to the full stored id.
pub fn resolve_item_id<'a, I>(ids: I, given: &str) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let given = given.trim();
    if given.is_empty() {
        return Err(VaultError::InvalidInput("item id cannot be empty".into()));
    }

    let matches: Vec<&str> = ids.into_iter().filter(|id| id.starts_with(given)).collect();
    match matches.as_slice() {
        [] => Err(VaultError::ItemNotFound(given.to_string())),
        [only] => Ok((*only).to_string()),
        many => Err(VaultError::InvalidInput(format!(
            "id prefix '{given}' matches {} items, use more characters",
            many.len()
        ))),
    }
}

/// First eight characters of an id, for tables.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
