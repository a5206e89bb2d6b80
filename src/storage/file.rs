//! Single-file JSON storage backend.
//!
//! The whole store is one JSON document.  Every mutating call reads the
//! document, applies the change and writes it back atomically (temp file in
//! the same directory, then rename).  On Unix the file is created `0o600`.
//! Calls on one `FileStorage` are serialized; separate processes writing the
//! same file concurrently are not coordinated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::document::{StoreDocument, DOCUMENT_VERSION};
use super::{Profile, StoredBlob, VaultStorage};
use crate::crypto::EncryptedBlob;
use crate::errors::{Result, VaultError};

/// JSON-document storage at a fixed path.
#[derive(Debug)]
pub struct FileStorage {
    path: Arc<PathBuf>,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Use `path` as the store.  The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against the current document on the blocking pool, writing
    /// the document back afterwards when `mutate` is set.
    async fn with_document<T, F>(&self, mutate: bool, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreDocument) -> Result<T> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = Arc::clone(&self.path);

        tokio::task::spawn_blocking(move || {
            let mut doc = read_document(&path)?;
            let out = op(&mut doc)?;
            if mutate {
                write_document(&path, &doc)?;
            }
            Ok(out)
        })
        .await
        .map_err(|e| VaultError::Storage(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl VaultStorage for FileStorage {
    async fn put_profile(&self, user_id: &str, profile: &Profile) -> Result<()> {
        let user_id = user_id.to_string();
        let profile = profile.clone();
        self.with_document(true, move |doc| doc.put_profile(&user_id, &profile))
            .await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let user_id = user_id.to_string();
        self.with_document(false, move |doc| Ok(doc.get_profile(&user_id)))
            .await
    }

    async fn put_blob(
        &self,
        user_id: &str,
        item_id: Option<&str>,
        blob: &EncryptedBlob,
    ) -> Result<String> {
        let user_id = user_id.to_string();
        let item_id = item_id.map(str::to_string);
        let blob = blob.clone();
        self.with_document(true, move |doc| {
            doc.put_blob(&user_id, item_id.as_deref(), &blob)
        })
        .await
    }

    async fn get_blobs(&self, user_id: &str) -> Result<Vec<StoredBlob>> {
        let user_id = user_id.to_string();
        self.with_document(false, move |doc| Ok(doc.get_blobs(&user_id)))
            .await
    }

    async fn delete_blob(&self, user_id: &str, item_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let item_id = item_id.to_string();
        self.with_document(true, move |doc| doc.delete_blob(&user_id, &item_id))
            .await
    }
}

/// Load the document, or an empty one if the file does not exist yet.
fn read_document(path: &Path) -> Result<StoreDocument> {
    if !path.exists() {
        return Ok(StoreDocument::default());
    }

    let bytes = fs::read(path)
        .map_err(|e| VaultError::Storage(format!("failed to read {}: {e}", path.display())))?;
    let doc: StoreDocument = serde_json::from_slice(&bytes)
        .map_err(|e| VaultError::Storage(format!("corrupt store {}: {e}", path.display())))?;

    if doc.version != DOCUMENT_VERSION {
        return Err(VaultError::Storage(format!(
            "unsupported store version {} in {}, expected {DOCUMENT_VERSION}",
            doc.version,
            path.display()
        )));
    }
    Ok(doc)
}

/// Write the document atomically: temp file next to the target, then rename.
fn write_document(path: &Path, doc: &StoreDocument) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(doc)
        .map_err(|e| VaultError::Serialization(format!("store document: {e}")))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|e| VaultError::Storage(format!("failed to create {}: {e}", parent.display())))?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let storage_err =
        |e: std::io::Error| VaultError::Storage(format!("failed to write {}: {e}", path.display()));

    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(storage_err)?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(&tmp_path).map_err(storage_err)?;

    file.write_all(&bytes).map_err(storage_err)?;
    file.sync_all().map_err(storage_err)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(storage_err)?;
    debug!(path = %path.display(), bytes = bytes.len(), "store written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn blob() -> EncryptedBlob {
        EncryptedBlob {
            alg: "A256GCM".into(),
            nonce: vec![7; 12],
            ciphertext: vec![1, 2, 3, 4],
            tag: vec![9; 16],
        }
    }

    #[tokio::test]
    async fn data_survives_a_new_handle() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let id = {
            let storage = FileStorage::new(&path);
            storage
                .put_profile(
                    "alice",
                    &Profile {
                        salt: [5; crate::crypto::SALT_LEN],
                        kdf: Default::default(),
                        verifier: None,
                        created_at: Utc::now(),
                    },
                )
                .await
                .unwrap();
            storage.put_blob("alice", None, &blob()).await.unwrap()
        };

        let reopened = FileStorage::new(&path);
        let blobs = reopened.get_blobs("alice").await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].id, id);
        assert_eq!(blobs[0].blob, blob());
        assert!(reopened.get_profile("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nope.json"));
        assert!(storage.get_blobs("anyone").await.unwrap().is_empty());
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_blobs("alice").await,
            Err(VaultError::Storage(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        FileStorage::new(&path)
            .put_blob("alice", None, &blob())
            .await
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
