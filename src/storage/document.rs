//! The in-memory shape of a storage backend's contents.
//!
//! Both shipped backends keep a `StoreDocument`: `MemoryStorage` holds one
//! behind a lock, `FileStorage` loads and rewrites one per call.  The rules
//! (immutable salt, per-user item ownership, timestamps) live here once.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{Profile, StoredBlob};
use crate::crypto::EncryptedBlob;
use crate::errors::{Result, VaultError};

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Everything stored for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    /// Items keyed by id.
    #[serde(default)]
    pub items: BTreeMap<String, StoredBlob>,
}

/// All users' profiles and ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            users: BTreeMap::new(),
        }
    }
}

impl StoreDocument {
    pub fn put_profile(&mut self, user_id: &str, profile: &Profile) -> Result<()> {
        let user = self.users.entry(user_id.to_string()).or_default();
        if let Some(existing) = &user.profile {
            if existing.salt != profile.salt {
                return Err(VaultError::Storage(format!(
                    "refusing to change the encryption salt of user '{user_id}'"
                )));
            }
        }
        user.profile = Some(profile.clone());
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Option<Profile> {
        self.users.get(user_id).and_then(|u| u.profile.clone())
    }

    pub fn put_blob(
        &mut self,
        user_id: &str,
        item_id: Option<&str>,
        blob: &EncryptedBlob,
    ) -> Result<String> {
        let now = Utc::now();
        let user = self.users.entry(user_id.to_string()).or_default();

        match item_id {
            Some(id) => {
                let existing = user
                    .items
                    .get_mut(id)
                    .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;
                existing.blob = blob.clone();
                existing.updated_at = now;
                Ok(id.to_string())
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                user.items.insert(
                    id.clone(),
                    StoredBlob {
                        id: id.clone(),
                        blob: blob.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                Ok(id)
            }
        }
    }

    pub fn get_blobs(&self, user_id: &str) -> Vec<StoredBlob> {
        self.users
            .get(user_id)
            .map(|u| u.items.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn delete_blob(&mut self, user_id: &str, item_id: &str) -> Result<()> {
        self.users
            .get_mut(user_id)
            .and_then(|u| u.items.remove(item_id))
            .map(|_| ())
            .ok_or_else(|| VaultError::ItemNotFound(item_id.to_string()))
    }
}
