//! The session key type.
//!
//! A `SessionKey` is the 256-bit output of key derivation.  It lives only
//! in volatile memory, is owned by the session manager, and is lent out
//! as `&SessionKey` for the duration of a single seal/open call.
//!
//! There is no `Clone` and no serde impl, and `Debug` is redacted.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the session key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Take ownership of raw key bytes.
    ///
    /// The caller's array is a copy; zeroize it after calling this.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build an AEAD cipher).
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Whether every byte of the key is zero.
    #[cfg(test)]
    fn is_wiped(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
