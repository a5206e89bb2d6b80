//! Session key lifetime.
//!
//! `SessionKeyManager` is the only holder of the derived key.  It moves
//! between two states:
//!
//! - `Locked`: no key in memory
//! - `Unlocked`: key plus the instant of the last activity
//!
//! Every transition and every use of the key goes through one async mutex,
//! so locking waits for an in-flight seal/open and can never wipe a key out
//! from under it.  An idle watcher task locks the session once no activity
//! has been seen for the configured threshold.

use std::sync::{Arc, Weak};
use std::time::Duration;

use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, EncryptedBlob, KdfParams, SessionKey};
use crate::errors::{Result, VaultError};

/// Default idle threshold before the session locks itself.
pub const DEFAULT_AUTO_LOCK: Duration = Duration::from_secs(15 * 60);

/// Associated data for the signup canary.
pub const CANARY_AAD: &[u8] = b"fishvault:canary:v1";

/// Known plaintext sealed into the canary.
const CANARY_PLAINTEXT: &[u8] = b"fishvault canary";

/// What `unlock` opens to decide whether the password is right.
#[derive(Debug, Clone)]
pub enum Verifier {
    /// The canary written at signup.
    Canary(EncryptedBlob),
    /// Any stored item, for profiles that predate canaries.
    Item { blob: EncryptedBlob, aad: Vec<u8> },
}

/// Snapshot of the session for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Locked,
    Unlocked { idle_remaining: Duration },
}

enum SessionState {
    Locked,
    Unlocked {
        key: SessionKey,
        last_activity: Instant,
        watcher: JoinHandle<()>,
    },
}

impl SessionState {
    /// Drop the key (wiping it) and stop the watcher.  Returns whether a key
    /// was actually held.
    fn lock_now(&mut self) -> bool {
        match std::mem::replace(self, SessionState::Locked) {
            SessionState::Locked => false,
            SessionState::Unlocked { watcher, .. } => {
                watcher.abort();
                true
            }
        }
    }
}

struct Shared {
    state: Mutex<SessionState>,
    auto_lock: Duration,
}

impl Shared {
    fn expired(&self, last_activity: Instant) -> bool {
        Instant::now().saturating_duration_since(last_activity) >= self.auto_lock
    }
}

/// Owner of the session key and its idle timer.
pub struct SessionKeyManager {
    shared: Arc<Shared>,
}

impl SessionKeyManager {
    pub fn new(auto_lock: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Locked),
                auto_lock,
            }),
        }
    }

    pub fn auto_lock(&self) -> Duration {
        self.shared.auto_lock
    }

    /// Derive the key, check it against `verifier`, and install it.
    ///
    /// A verifier that fails authentication yields `WrongMasterPassword`
    /// and leaves the session as it was.  With no verifier at all (an empty
    /// vault from before canaries) the key is accepted unchecked.
    pub async fn unlock(
        &self,
        password: Zeroizing<Vec<u8>>,
        salt: &[u8],
        params: KdfParams,
        verifier: Option<Verifier>,
    ) -> Result<()> {
        let key = crypto::derive_async(password, salt, params).await?;

        match verifier {
            Some(Verifier::Canary(blob)) => {
                let plaintext = open_verifier(&key, &blob, CANARY_AAD)?;
                if !bool::from(plaintext.as_slice().ct_eq(CANARY_PLAINTEXT)) {
                    return Err(VaultError::Format(
                        "verification canary has unexpected contents".into(),
                    ));
                }
            }
            Some(Verifier::Item { blob, aad }) => {
                open_verifier(&key, &blob, &aad)?;
            }
            None => warn!("no verifier available; accepting master password unchecked"),
        }

        self.install(key).await;
        info!("vault unlocked");
        Ok(())
    }

    /// Install an already-verified key, replacing any current one.
    pub(crate) async fn install(&self, key: SessionKey) {
        let mut state = self.shared.state.lock().await;
        state.lock_now();
        *state = SessionState::Unlocked {
            key,
            last_activity: Instant::now(),
            watcher: spawn_watcher(Arc::downgrade(&self.shared)),
        };
    }

    /// Run `f` with the key.  Counts as activity.
    ///
    /// The closure runs while the state mutex is held, so it must be short
    /// synchronous crypto, not I/O.
    pub async fn with_key<T>(&self, f: impl FnOnce(&SessionKey) -> Result<T>) -> Result<T> {
        let mut state = self.shared.state.lock().await;

        let expired = match &*state {
            SessionState::Locked => return Err(VaultError::NotUnlocked),
            SessionState::Unlocked { last_activity, .. } => self.shared.expired(*last_activity),
        };
        if expired {
            state.lock_now();
            info!("vault locked after idle timeout");
            return Err(VaultError::NotUnlocked);
        }

        match &mut *state {
            SessionState::Unlocked {
                key, last_activity, ..
            } => {
                *last_activity = Instant::now();
                f(key)
            }
            SessionState::Locked => Err(VaultError::NotUnlocked),
        }
    }

    /// Record user activity without touching the key.
    pub async fn touch(&self) {
        let mut state = self.shared.state.lock().await;
        if let SessionState::Unlocked { last_activity, .. } = &mut *state {
            *last_activity = Instant::now();
        }
    }

    /// Wipe the key.  Safe to call when already locked.
    pub async fn lock(&self) {
        if self.shared.state.lock().await.lock_now() {
            info!("vault locked");
        }
    }

    /// Lock and forget the session entirely.
    pub async fn sign_out(&self) {
        if self.shared.state.lock().await.lock_now() {
            info!("signed out");
        }
    }

    pub async fn is_unlocked(&self) -> bool {
        matches!(self.status().await, SessionStatus::Unlocked { .. })
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.shared.state.lock().await;
        match &*state {
            SessionState::Locked => SessionStatus::Locked,
            SessionState::Unlocked { last_activity, .. } => {
                let idle = Instant::now().saturating_duration_since(*last_activity);
                match self.shared.auto_lock.checked_sub(idle) {
                    Some(remaining) if !remaining.is_zero() => SessionStatus::Unlocked {
                        idle_remaining: remaining,
                    },
                    _ => SessionStatus::Locked,
                }
            }
        }
    }
}

impl Default for SessionKeyManager {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_LOCK)
    }
}

impl Drop for SessionKeyManager {
    fn drop(&mut self) {
        // If the watcher holds the lock right now it will find the manager
        // gone on its next pass; the key still drops with `Shared`.
        if let Ok(mut state) = self.shared.state.try_lock() {
            state.lock_now();
        }
    }
}

/// Seal the canary for a freshly derived key.
pub fn create_verifier(key: &SessionKey) -> Result<EncryptedBlob> {
    crypto::seal(key, CANARY_PLAINTEXT, Some(CANARY_AAD))
}

fn open_verifier(key: &SessionKey, blob: &EncryptedBlob, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    crypto::open(key, blob, Some(aad)).map_err(|e| match e {
        VaultError::AuthenticationFailed => {
            warn!("unlock rejected: master password did not verify");
            VaultError::WrongMasterPassword
        }
        other => other,
    })
}

/// Sleep until the idle deadline; re-arm if activity moved it, lock if not.
fn spawn_watcher(shared: Weak<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let deadline = {
                let Some(shared) = shared.upgrade() else { return };
                let state = shared.state.lock().await;
                let SessionState::Unlocked { last_activity, .. } = &*state else {
                    return;
                };
                *last_activity + shared.auto_lock
            };

            tokio::time::sleep_until(deadline).await;

            let Some(shared) = shared.upgrade() else { return };
            let mut state = shared.state.lock().await;
            let expired = match &*state {
                SessionState::Locked => return,
                SessionState::Unlocked { last_activity, .. } => shared.expired(*last_activity),
            };
            if expired {
                // Dropping our own handle detaches rather than aborts.
                *state = SessionState::Locked;
                info!("vault locked after idle timeout");
                return;
            }
            debug!("activity seen, idle watcher re-armed");
        }
    })
}
