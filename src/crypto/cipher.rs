//! AES-256-GCM authenticated encryption of arbitrary payloads.
//!
//! `seal` draws a fresh random 12-byte nonce from the OS for every call;
//! there is no way to pass a nonce in.  `open` verifies the tag over the
//! nonce, ciphertext and associated data, and returns nothing but an error
//! when verification fails.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroizing;

use super::blob::EncryptedBlob;
use super::keys::SessionKey;
use crate::errors::{Result, VaultError};

/// Algorithm tag written into every blob sealed by this module.
pub const ALG_AES_256_GCM: &str = "A256GCM";

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

fn cipher_for(key: &SessionKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(format!("invalid key length: {e}")))
}

/// Encrypt and authenticate `plaintext` under `key`.
///
/// `aad` is authenticated but not encrypted; the same value must be passed
/// to `open`.
pub fn seal(key: &SessionKey, plaintext: &[u8], aad: Option<&[u8]>) -> Result<EncryptedBlob> {
    let cipher = cipher_for(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, aad.unwrap_or_default(), &mut buffer)
        .map_err(|e| VaultError::Encryption(format!("encryption error: {e}")))?;

    Ok(EncryptedBlob {
        alg: ALG_AES_256_GCM.to_string(),
        nonce: nonce.to_vec(),
        ciphertext: buffer,
        tag: tag.to_vec(),
    })
}

/// Verify and decrypt a blob produced by `seal`.
///
/// Wrong key, wrong associated data, or any modified byte yields
/// `AuthenticationFailed`.  The returned plaintext is wiped on drop.
pub fn open(
    key: &SessionKey,
    blob: &EncryptedBlob,
    aad: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>> {
    if blob.alg != ALG_AES_256_GCM {
        return Err(VaultError::Format(format!(
            "unsupported cipher algorithm '{}'",
            blob.alg
        )));
    }
    if blob.nonce.len() != NONCE_LEN || blob.tag.len() != TAG_LEN {
        return Err(VaultError::AuthenticationFailed);
    }

    let cipher = cipher_for(key).map_err(|_| VaultError::AuthenticationFailed)?;
    let nonce = Nonce::from_slice(&blob.nonce);
    let tag = Tag::from_slice(&blob.tag);

    // The buffer may hold unauthenticated bytes if verification fails;
    // it is wiped when dropped on the error path.
    let mut buffer = Zeroizing::new(blob.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(nonce, aad.unwrap_or_default(), &mut *buffer, tag)
        .map_err(|_| VaultError::AuthenticationFailed)?;

    Ok(buffer)
}
