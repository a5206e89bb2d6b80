//! In-process storage backend.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::document::StoreDocument;
use super::{Profile, StoredBlob, VaultStorage};
use crate::crypto::EncryptedBlob;
use crate::errors::Result;

/// Keeps every profile and blob in memory.  Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    doc: RwLock<StoreDocument>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStorage for MemoryStorage {
    async fn put_profile(&self, user_id: &str, profile: &Profile) -> Result<()> {
        self.doc.write().await.put_profile(user_id, profile)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.doc.read().await.get_profile(user_id))
    }

    async fn put_blob(
        &self,
        user_id: &str,
        item_id: Option<&str>,
        blob: &EncryptedBlob,
    ) -> Result<String> {
        self.doc.write().await.put_blob(user_id, item_id, blob)
    }

    async fn get_blobs(&self, user_id: &str) -> Result<Vec<StoredBlob>> {
        Ok(self.doc.read().await.get_blobs(user_id))
    }

    async fn delete_blob(&self, user_id: &str, item_id: &str) -> Result<()> {
        self.doc.write().await.delete_blob(user_id, item_id)
    }
}
