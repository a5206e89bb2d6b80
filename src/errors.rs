use thiserror::Error;

/// All errors that can occur in FishVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input validation (before any crypto work) ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Authentication failed — wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Wrong master password")]
    WrongMasterPassword,

    // --- Payload errors (authenticated but undecodable) ---
    #[error("Invalid record format: {0}")]
    Format(String),

    // --- Session errors ---
    #[error("Vault is locked — unlock it with your master password")]
    NotUnlocked,

    // --- Storage collaborator errors ---
    #[error("No vault profile for user '{0}'")]
    ProfileNotFound(String),

    #[error("Vault item '{0}' not found")]
    ItemNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // --- Clipboard errors ---
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Whether the caller may retry the same request.
    ///
    /// Only storage failures qualify: re-sending the same ciphertext for the
    /// same item id is idempotent. Authentication failures are never retried
    /// with the same key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::Storage(_))
    }
}

/// Convenience type alias for FishVault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_retryable() {
        assert!(VaultError::Storage("timeout".into()).is_retryable());
        assert!(!VaultError::AuthenticationFailed.is_retryable());
        assert!(!VaultError::NotUnlocked.is_retryable());
        assert!(!VaultError::Format("bad".into()).is_retryable());
    }

    #[test]
    fn authentication_message_mentions_both_causes() {
        let msg = VaultError::AuthenticationFailed.to_string();
        assert!(msg.contains("wrong password"));
        assert!(msg.contains("corrupted"));
    }
}
