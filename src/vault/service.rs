//! High-level vault operations used by the CLI and embedders.
//!
//! `VaultService` binds one user id, one storage collaborator and one shared
//! `SessionKeyManager`.  It holds no persistent state of its own: every call
//! reads or writes ciphertext through the storage trait and touches the key
//! only through `SessionKeyManager::with_key`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::codec;
use super::generator::MIN_MASTER_PASSWORD_LEN;
use super::record::{DecryptedItem, ItemResult, VaultRecord};
use crate::crypto::{self, EncryptedBlob, KdfParams, SessionKey};
use crate::errors::{Result, VaultError};
use crate::session::{self, SessionKeyManager, Verifier};
use crate::storage::{Profile, VaultStorage};

/// Prefix of the associated data bound into every item blob.
const ITEM_AAD_PREFIX: &str = "fishvault:item:v1:";

/// Associated data for items owned by `user_id`.
pub fn item_aad(user_id: &str) -> Vec<u8> {
    format!("{ITEM_AAD_PREFIX}{user_id}").into_bytes()
}

/// The vault of a single user.
pub struct VaultService {
    storage: Arc<dyn VaultStorage>,
    session: Arc<SessionKeyManager>,
    user_id: String,
    aad: Vec<u8>,
}

impl VaultService {
    pub fn new(
        storage: Arc<dyn VaultStorage>,
        session: Arc<SessionKeyManager>,
        user_id: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();
        let aad = item_aad(&user_id);
        Self {
            storage,
            session,
            user_id,
            aad,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session(&self) -> &Arc<SessionKeyManager> {
        &self.session
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Create the user's vault and leave the session unlocked.
    ///
    /// Fails if a profile already exists; the salt is written exactly once.
    pub async fn signup(&self, password: &str, params: KdfParams) -> Result<Profile> {
        // 1. Validate before spending any time in the KDF.
        if password.chars().count() < MIN_MASTER_PASSWORD_LEN {
            return Err(VaultError::InvalidInput(format!(
                "master password must be at least {MIN_MASTER_PASSWORD_LEN} characters"
            )));
        }
        params.validate()?;

        if self.storage.get_profile(&self.user_id).await?.is_some() {
            return Err(VaultError::InvalidInput(format!(
                "a vault already exists for user '{}'",
                self.user_id
            )));
        }

        // 2. Fresh salt, derived key, and the canary that proves it later.
        let salt = crypto::generate_salt();
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let key = crypto::derive_async(password, &salt, params).await?;
        let verifier = session::create_verifier(&key)?;

        // 3. Persist the profile, then hand the key to the session.
        let profile = Profile {
            salt,
            kdf: params,
            verifier: Some(verifier),
            created_at: Utc::now(),
        };
        self.storage.put_profile(&self.user_id, &profile).await?;
        self.session.install(key).await;

        info!(
            user = %self.user_id,
            kdf = profile.kdf.algorithm_name(),
            "vault created"
        );
        Ok(profile)
    }

    /// Unlock with the master password.
    ///
    /// Profiles without a canary are verified against the first stored
    /// item instead.  A profile with neither gets a fresh canary sealed
    /// under the new key, so only the first unlock goes unchecked.
    pub async fn unlock(&self, password: &str) -> Result<()> {
        let mut profile = self
            .storage
            .get_profile(&self.user_id)
            .await?
            .ok_or_else(|| VaultError::ProfileNotFound(self.user_id.clone()))?;

        let verifier = match profile.verifier {
            Some(canary) => Some(Verifier::Canary(canary)),
            None => {
                debug!("profile has no canary, verifying against a stored item");
                self.storage
                    .get_blobs(&self.user_id)
                    .await?
                    .into_iter()
                    .next()
                    .map(|stored| Verifier::Item {
                        blob: stored.blob,
                        aad: self.aad.clone(),
                    })
            }
        };

        let unchecked = verifier.is_none();
        let password = Zeroizing::new(password.as_bytes().to_vec());
        self.session
            .unlock(password, &profile.salt, profile.kdf, verifier)
            .await?;

        if unchecked {
            let canary = self.session.with_key(session::create_verifier).await?;
            profile.verifier = Some(canary);
            if let Err(e) = self.storage.put_profile(&self.user_id, &profile).await {
                self.session.lock().await;
                return Err(e);
            }
            info!(user = %self.user_id, "verification canary written to profile");
        }
        Ok(())
    }

    pub async fn lock(&self) {
        self.session.lock().await;
    }

    pub async fn sign_out(&self) {
        self.session.sign_out().await;
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Decrypt every item, newest first.
    ///
    /// An item that fails to open or decode is reported in its own
    /// `ItemResult` and does not affect the others.
    pub async fn list_items(&self) -> Result<Vec<ItemResult>> {
        let blobs = self.storage.get_blobs(&self.user_id).await?;

        let mut items = self
            .session
            .with_key(|key| {
                Ok(blobs
                    .into_iter()
                    .map(|stored| ItemResult {
                        record: open_record(key, &stored.blob, &self.aad),
                        id: stored.id,
                        created_at: stored.created_at,
                        updated_at: stored.updated_at,
                    })
                    .collect::<Vec<_>>())
            })
            .await?;

        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut failed = 0usize;
        for item in &items {
            if let Err(e) = &item.record {
                failed += 1;
                warn!(id = %item.id, error = %e, "vault item could not be decrypted");
            }
        }
        debug!(total = items.len(), failed, "vault items listed");

        Ok(items)
    }

    /// Decrypt a single item.
    pub async fn get_item(&self, id: &str) -> Result<DecryptedItem> {
        let stored = self
            .storage
            .get_blobs(&self.user_id)
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;

        let record = self
            .session
            .with_key(|key| open_record(key, &stored.blob, &self.aad))
            .await?;

        Ok(DecryptedItem {
            id: stored.id,
            record,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    /// Decrypted items for which `predicate` holds.  Undecryptable items
    /// are skipped.
    pub async fn search<P>(&self, predicate: P) -> Result<Vec<DecryptedItem>>
    where
        P: Fn(&VaultRecord) -> bool,
    {
        Ok(self
            .list_items()
            .await?
            .into_iter()
            .filter_map(|item| item.into_decrypted().ok())
            .filter(|item| predicate(&item.record))
            .collect())
    }

    /// Case-insensitive substring search over title, username, website and
    /// category.  An empty query matches everything.
    pub async fn search_text(&self, query: &str) -> Result<Vec<DecryptedItem>> {
        let needle = query.trim().to_lowercase();
        self.search(|record| {
            if needle.is_empty() {
                return true;
            }
            [
                Some(record.title.as_str()),
                Some(record.username.as_str()),
                record.website_url.as_deref(),
                record.category.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Encrypt and store a new item; returns its id.
    pub async fn create_item(&self, record: &VaultRecord) -> Result<String> {
        let blob = self.seal(record).await?;
        let id = self.storage.put_blob(&self.user_id, None, &blob).await?;
        info!(id = %id, "vault item created");
        Ok(id)
    }

    /// Replace an existing item's contents.
    pub async fn update_item(&self, id: &str, record: &VaultRecord) -> Result<()> {
        let blob = self.seal(record).await?;
        self.storage
            .put_blob(&self.user_id, Some(id), &blob)
            .await?;
        info!(id = %id, "vault item updated");
        Ok(())
    }

    /// Remove an item.  Requires an unlocked session.
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        self.session.with_key(|_| Ok(())).await?;
        self.storage.delete_blob(&self.user_id, id).await?;
        info!(id = %id, "vault item deleted");
        Ok(())
    }

    async fn seal(&self, record: &VaultRecord) -> Result<EncryptedBlob> {
        record.validate()?;
        self.session
            .with_key(|key| seal_record(key, record, &self.aad))
            .await
    }
}

fn seal_record(key: &SessionKey, record: &VaultRecord, aad: &[u8]) -> Result<EncryptedBlob> {
    let plaintext = codec::encode(record)?;
    crypto::seal(key, &plaintext, Some(aad))
}

fn open_record(key: &SessionKey, blob: &EncryptedBlob, aad: &[u8]) -> Result<VaultRecord> {
    let plaintext = crypto::open(key, blob, Some(aad))?;
    codec::decode(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;
    use crate::storage::MemoryStorage;

    const FAST: KdfParams = KdfParams::Argon2id {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    };

    fn service(storage: &Arc<MemoryStorage>, user: &str) -> VaultService {
        VaultService::new(
            storage.clone(),
            Arc::new(SessionKeyManager::default()),
            user,
        )
    }

    #[test]
    fn blob_sealed_for_one_user_fails_for_another() {
        let key = SessionKey::new([3u8; KEY_LEN]);
        let record = VaultRecord::new("Bank", "me", "pw");

        let blob = seal_record(&key, &record, &item_aad("alice")).unwrap();
        assert_eq!(open_record(&key, &blob, &item_aad("alice")).unwrap(), record);
        assert!(matches!(
            open_record(&key, &blob, &item_aad("bob")),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn short_master_password_is_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = service(&storage, "alice");
        assert!(matches!(
            vault.signup("short", FAST).await,
            Err(VaultError::InvalidInput(_))
        ));
        assert!(storage.get_profile("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_signup_is_refused() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = service(&storage, "alice");
        vault.signup("password1", FAST).await.unwrap();
        assert!(matches!(
            vault.signup("password2", FAST).await,
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn invalid_record_never_reaches_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = service(&storage, "alice");
        vault.signup("password1", FAST).await.unwrap();

        let err = vault
            .create_item(&VaultRecord::new("", "me", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
        assert!(storage.get_blobs("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_profile_verifies_against_first_item() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = service(&storage, "alice");
        let profile = vault.signup("password1", FAST).await.unwrap();
        vault
            .create_item(&VaultRecord::new("Bank", "me", "pw"))
            .await
            .unwrap();

        // Strip the canary the way an old profile would look.
        let legacy = Profile {
            verifier: None,
            ..profile
        };
        storage.put_profile("alice", &legacy).await.unwrap();

        let fresh = service(&storage, "alice");
        assert!(matches!(
            fresh.unlock("password2").await,
            Err(VaultError::WrongMasterPassword)
        ));
        fresh.unlock("password1").await.unwrap();
        assert_eq!(fresh.list_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_profile_without_canary_gets_one_on_unlock() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = service(&storage, "alice");
        let profile = vault.signup("password1", FAST).await.unwrap();

        let bare = Profile {
            verifier: None,
            ..profile
        };
        storage.put_profile("alice", &bare).await.unwrap();

        let first = service(&storage, "alice");
        first.unlock("password1").await.unwrap();

        let stored = storage.get_profile("alice").await.unwrap().unwrap();
        assert!(stored.verifier.is_some());
        assert_eq!(stored.salt, bare.salt);

        let second = service(&storage, "alice");
        assert!(matches!(
            second.unlock("password2").await,
            Err(VaultError::WrongMasterPassword)
        ));
        assert!(!second.session().is_unlocked().await);
        second.unlock("password1").await.unwrap();
    }
}
