//! The self-describing encrypted blob.
//!
//! An `EncryptedBlob` is the only thing the storage collaborator ever sees.
//! Every field carries its own length so a future algorithm with different
//! nonce or tag sizes can coexist with old records.
//!
//! Binary layout (`to_bytes` / `from_bytes`):
//!
//! ```text
//! ["FVB": 3 bytes][version: 1 byte]
//! [alg_len: u16 BE][alg: UTF-8]
//! [nonce_len: u16 BE][nonce]
//! [ciphertext_len: u32 BE][ciphertext]
//! [tag_len: u16 BE][tag]
//! ```
//!
//! In JSON documents the byte fields are base64 strings.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};
use crate::wire::ByteReader;

/// Magic bytes at the start of every serialized blob.
const MAGIC: &[u8; 3] = b"FVB";

/// Current binary blob layout version.
pub const BLOB_VERSION: u8 = 1;

/// Upper bound on the algorithm tag length.
const MAX_ALG_LEN: usize = 64;

/// An AEAD output together with everything needed to open it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// Algorithm tag, e.g. `"A256GCM"`.
    pub alg: String,

    /// Per-message nonce.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// Ciphertext without the authentication tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// Authentication tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub tag: Vec<u8>,
}

impl EncryptedBlob {
    /// Serialize into the length-prefixed binary layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let alg = self.alg.as_bytes();
        if alg.is_empty() || alg.len() > MAX_ALG_LEN {
            return Err(VaultError::Format(format!(
                "algorithm tag must be 1..={MAX_ALG_LEN} bytes"
            )));
        }
        let alg_len = u16::try_from(alg.len())
            .map_err(|_| VaultError::Format("algorithm tag too long".into()))?;
        let nonce_len = u16::try_from(self.nonce.len())
            .map_err(|_| VaultError::Format("nonce too long".into()))?;
        let ct_len = u32::try_from(self.ciphertext.len())
            .map_err(|_| VaultError::Format("ciphertext exceeds u32::MAX".into()))?;
        let tag_len = u16::try_from(self.tag.len())
            .map_err(|_| VaultError::Format("tag too long".into()))?;

        let total = MAGIC.len()
            + 1
            + 2
            + alg.len()
            + 2
            + self.nonce.len()
            + 4
            + self.ciphertext.len()
            + 2
            + self.tag.len();
        let mut buf = Vec::with_capacity(total);

        buf.extend_from_slice(MAGIC);
        buf.push(BLOB_VERSION);
        buf.extend_from_slice(&alg_len.to_be_bytes());
        buf.extend_from_slice(alg);
        buf.extend_from_slice(&nonce_len.to_be_bytes());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&ct_len.to_be_bytes());
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&tag_len.to_be_bytes());
        buf.extend_from_slice(&self.tag);

        Ok(buf)
    }

    /// Parse the binary layout, validating every length before slicing.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data, "blob");

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(VaultError::Format("missing FVB magic bytes".into()));
        }
        let version = reader.u8()?;
        if version != BLOB_VERSION {
            return Err(VaultError::Format(format!(
                "unsupported blob version {version}, expected {BLOB_VERSION}"
            )));
        }

        let alg_len = usize::from(reader.u16()?);
        if alg_len == 0 || alg_len > MAX_ALG_LEN {
            return Err(VaultError::Format(format!(
                "algorithm tag length {alg_len} out of range"
            )));
        }
        let alg = std::str::from_utf8(reader.take(alg_len)?)
            .map_err(|_| VaultError::Format("algorithm tag is not UTF-8".into()))?
            .to_string();

        let nonce_len = usize::from(reader.u16()?);
        let nonce = reader.take(nonce_len)?.to_vec();

        let ct_len = reader.len_u32()?;
        let ciphertext = reader.take(ct_len)?.to_vec();

        let tag_len = usize::from(reader.u16()?);
        let tag = reader.take(tag_len)?.to_vec();

        reader.finish()?;

        Ok(Self {
            alg,
            nonce,
            ciphertext,
            tag,
        })
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded byte fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
