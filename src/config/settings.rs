use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

/// Per-directory configuration, loaded from `.fishvault.toml`.
///
/// Every field has a sensible default so FishVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Store file (relative to the working directory unless absolute).
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// User id whose vault the CLI operates on.
    #[serde(default = "default_user")]
    pub user: String,

    /// KDF used when creating a vault: "argon2id" or "pbkdf2-sha256".
    #[serde(default = "default_kdf_algorithm")]
    pub kdf_algorithm: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// PBKDF2-HMAC-SHA256 iteration count (default: 600 000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Idle minutes before an unlocked session locks itself.
    #[serde(default = "default_auto_lock_minutes")]
    pub auto_lock_minutes: u64,

    /// Seconds before a copied secret is cleared from the clipboard.
    #[serde(default = "default_clipboard_clear_seconds")]
    pub clipboard_clear_seconds: u64,

    /// Length of passwords produced by `generate`.
    #[serde(default = "default_generator_length")]
    pub generator_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_file() -> String {
    ".fishvault/store.json".to_string()
}

fn default_user() -> String {
    "default".to_string()
}

fn default_kdf_algorithm() -> String {
    "argon2id".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_pbkdf2_iterations() -> u32 {
    600_000
}

fn default_auto_lock_minutes() -> u64 {
    15
}

fn default_clipboard_clear_seconds() -> u64 {
    30
}

fn default_generator_length() -> usize {
    crate::vault::generator::DEFAULT_LENGTH
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            user: default_user(),
            kdf_algorithm: default_kdf_algorithm(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            auto_lock_minutes: default_auto_lock_minutes(),
            clipboard_clear_seconds: default_clipboard_clear_seconds(),
            generator_length: default_generator_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".fishvault.toml";

    /// Load settings from `<dir>/.fishvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If it exists but
    /// cannot be parsed or holds unusable values, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject values that would make the vault unusable.
    pub fn validate(&self) -> Result<()> {
        if self.auto_lock_minutes == 0 {
            return Err(VaultError::Config(
                "auto_lock_minutes must be at least 1".into(),
            ));
        }
        if self.clipboard_clear_seconds == 0 {
            return Err(VaultError::Config(
                "clipboard_clear_seconds must be at least 1".into(),
            ));
        }
        if self.user.trim().is_empty() {
            return Err(VaultError::Config("user cannot be empty".into()));
        }
        self.kdf_params()?;
        Ok(())
    }

    /// Absolute path of the store file.
    pub fn data_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.data_file)
    }

    /// KDF parameters for new vaults.
    pub fn kdf_params(&self) -> Result<KdfParams> {
        let params = match self.kdf_algorithm.as_str() {
            "argon2id" => KdfParams::Argon2id {
                memory_kib: self.argon2_memory_kib,
                iterations: self.argon2_iterations,
                parallelism: self.argon2_parallelism,
            },
            "pbkdf2-sha256" => KdfParams::Pbkdf2Sha256 {
                iterations: self.pbkdf2_iterations,
            },
            other => {
                return Err(VaultError::Config(format!(
                    "unknown kdf_algorithm '{other}' (expected argon2id or pbkdf2-sha256)"
                )))
            }
        };
        params
            .validate()
            .map_err(|e| VaultError::Config(e.to_string()))?;
        Ok(params)
    }

    pub fn auto_lock(&self) -> Duration {
        Duration::from_secs(self.auto_lock_minutes.saturating_mul(60))
    }

    pub fn clipboard_clear(&self) -> Duration {
        Duration::from_secs(self.clipboard_clear_seconds)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
