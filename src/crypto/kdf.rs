//! Password-based key derivation.
//!
//! Argon2id (memory-hard, the default) or PBKDF2-HMAC-SHA256 turn a master
//! password and the user's 32-byte salt into a 256-bit `SessionKey`.  The
//! parameters used at signup are stored in the user's profile, so every later
//! unlock runs with exactly the same settings.
//!
//! Derivation is slow.  Async callers go through `derive_async`, which runs
//! the work on tokio's blocking pool.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use super::keys::{SessionKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the per-user salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum safe Argon2 memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Maximum Argon2 memory cost in KiB (4 GiB).  Profiles come from storage,
/// so this also bounds what a hostile store can make an unlock allocate.
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Maximum Argon2 passes.
const MAX_ARGON2_ITERATIONS: u32 = 64;

/// Maximum Argon2 lanes.
const MAX_PARALLELISM: u32 = 64;

/// Minimum PBKDF2 iteration count accepted for new or existing profiles.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Maximum PBKDF2 iteration count.
const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Key derivation function and its work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum KdfParams {
    /// Argon2id v1.3.
    #[serde(rename = "argon2id")]
    Argon2id {
        /// Memory cost in KiB (default: 65 536 = 64 MB).
        memory_kib: u32,
        /// Number of passes (default: 3).
        iterations: u32,
        /// Parallelism lanes (default: 4).
        parallelism: u32,
    },
    /// PBKDF2 with HMAC-SHA256.
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256 {
        /// Iteration count (default: 600 000).
        iterations: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Argon2id {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Short algorithm name, as written in config files.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Argon2id { .. } => "argon2id",
            Self::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
        }
    }

    /// Reject work factors that are dangerously weak or too costly to run.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                check_range("Argon2 memory_kib", memory_kib, MIN_MEMORY_KIB, MAX_MEMORY_KIB)?;
                check_range("Argon2 iterations", iterations, 1, MAX_ARGON2_ITERATIONS)?;
                check_range("Argon2 parallelism", parallelism, 1, MAX_PARALLELISM)?;
            }
            Self::Pbkdf2Sha256 { iterations } => {
                check_range(
                    "PBKDF2 iterations",
                    iterations,
                    MIN_PBKDF2_ITERATIONS,
                    MAX_PBKDF2_ITERATIONS,
                )?;
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min {
        return Err(VaultError::KeyDerivation(format!(
            "{name} must be at least {min} (got {value})"
        )));
    }
    if value > max {
        return Err(VaultError::KeyDerivation(format!(
            "{name} must be at most {max} (got {value})"
        )));
    }
    Ok(())
}

/// Check the password and salt before spending any time on derivation.
fn validate_inputs(password: &[u8], salt: &[u8]) -> Result<()> {
    if password.is_empty() {
        return Err(VaultError::InvalidInput(
            "master password cannot be empty".into(),
        ));
    }
    if salt.len() != SALT_LEN {
        return Err(VaultError::InvalidInput(format!(
            "salt must be exactly {SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    Ok(())
}

/// Derive a 32-byte session key from a password and salt.
///
/// The same password + salt + params always produce the same key.
/// This call blocks for as long as the work factor dictates.
pub fn derive(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<SessionKey> {
    validate_inputs(password, salt)?;
    params.validate()?;

    let mut output = [0u8; KEY_LEN];
    let outcome = match *params {
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => argon2id_into(password, salt, memory_kib, iterations, parallelism, &mut output),
        KdfParams::Pbkdf2Sha256 { iterations } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut output);
            Ok(())
        }
    };

    let key = outcome.map(|()| SessionKey::new(output));
    output.zeroize();
    key
}

fn argon2id_into(
    password: &[u8],
    salt: &[u8],
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    output: &mut [u8; KEY_LEN],
) -> Result<()> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
        .map_err(|e| VaultError::KeyDerivation(format!("invalid Argon2 params: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password, salt, output)
        .map_err(|e| VaultError::KeyDerivation(format!("Argon2id hashing failed: {e}")))
}

/// Derive a session key on the blocking thread pool.
///
/// Input validation happens on the calling task so a bad password or salt
/// is reported without ever touching the pool.  The password buffer is
/// moved into the worker and wiped there when it drops.
pub async fn derive_async(
    password: Zeroizing<Vec<u8>>,
    salt: &[u8],
    params: KdfParams,
) -> Result<SessionKey> {
    validate_inputs(&password, salt)?;
    params.validate()?;

    let salt = salt.to_vec();
    tokio::task::spawn_blocking(move || derive(&password, &salt, &params))
        .await
        .map_err(|e| VaultError::KeyDerivation(format!("derivation task failed: {e}")))?
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
