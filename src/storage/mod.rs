//! The storage collaborator boundary.
//!
//! FishVault never talks to a database or network service directly.  It
//! consumes the narrow, blob-level `VaultStorage` trait below, and every
//! value that crosses it is either ciphertext or a non-secret salt.
//!
//! Two implementations ship with the crate:
//! - `MemoryStorage`: in-process, for tests and embedding (`memory`)
//! - `FileStorage`: a single JSON document on disk with atomic writes (`file`)

pub mod document;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptedBlob, KdfParams, SALT_LEN};
use crate::errors::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Per-user key material metadata, written once at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The user's KDF salt.  Never changes once written.
    #[serde(serialize_with = "salt_encode", deserialize_with = "salt_decode")]
    pub salt: [u8; SALT_LEN],

    /// KDF algorithm and work factor chosen at signup.
    #[serde(default)]
    pub kdf: KdfParams,

    /// Canary blob used to tell a wrong master password from a right one.
    /// Absent on profiles created before verifiers existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier: Option<EncryptedBlob>,

    pub created_at: DateTime<Utc>,
}

/// One stored vault item as returned by `get_blobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub id: String,
    pub blob: EncryptedBlob,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blob-level storage collaborator.
///
/// Implementations must be safe to call concurrently.  Failures are
/// reported as `VaultError::Storage` (or `ItemNotFound`); callers decide
/// whether to retry.
#[async_trait]
pub trait VaultStorage: Send + Sync {
    /// Store the user's profile.  Refuses to change an existing salt.
    async fn put_profile(&self, user_id: &str, profile: &Profile) -> Result<()>;

    /// Fetch the user's profile, if one exists.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Create (`item_id = None`) or replace an item; returns its id.
    async fn put_blob(
        &self,
        user_id: &str,
        item_id: Option<&str>,
        blob: &EncryptedBlob,
    ) -> Result<String>;

    /// All items for the user, in no particular order.
    async fn get_blobs(&self, user_id: &str) -> Result<Vec<StoredBlob>>;

    /// Remove one item.
    async fn delete_blob(&self, user_id: &str, item_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Serde helpers for the fixed-size salt
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn salt_encode<S>(salt: &[u8; SALT_LEN], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(salt))
}

fn salt_decode<'de, D>(deserializer: D) -> std::result::Result<[u8; SALT_LEN], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
    <[u8; SALT_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        serde::de::Error::custom(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}
