//! Cryptographic primitives for FishVault.
//!
//! This module provides:
//! - Argon2id / PBKDF2 password-based key derivation (`kdf`)
//! - The zeroizing `SessionKey` type (`keys`)
//! - AES-256-GCM seal/open with internal nonce generation (`cipher`)
//! - The self-describing `EncryptedBlob` container (`blob`)

pub mod blob;
pub mod cipher;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive, ...};
pub use blob::EncryptedBlob;
pub use cipher::{open, seal, ALG_AES_256_GCM};
pub use kdf::{derive, derive_async, generate_salt, KdfParams, SALT_LEN};
pub use keys::{SessionKey, KEY_LEN};
