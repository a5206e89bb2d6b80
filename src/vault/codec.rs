//! Versioned binary encoding of `VaultRecord` plaintext.
//!
//! This is the payload that gets sealed.  Layout, version 1:
//!
//! ```text
//! [version: 1 byte][field_count: 1 byte]
//! field_count x [tag: 1 byte][len: u32 BE][UTF-8 bytes]
//! ```
//!
//! Tags: 1 title, 2 username, 3 secret, 4 website_url, 5 notes, 6 category.
//! Unknown tags are skipped so newer writers can add fields without
//! breaking older readers.  Everything else that is off (missing required
//! field, duplicate tag, bad length, bad UTF-8, trailing bytes) is a
//! `Format` error, which callers can tell apart from a failed decryption.

use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::record::VaultRecord;
use crate::errors::{Result, VaultError};
use crate::wire::ByteReader;

/// Current record layout version.
pub const RECORD_VERSION: u8 = 1;

const TAG_TITLE: u8 = 1;
const TAG_USERNAME: u8 = 2;
const TAG_SECRET: u8 = 3;
const TAG_WEBSITE: u8 = 4;
const TAG_NOTES: u8 = 5;
const TAG_CATEGORY: u8 = 6;

/// Encode a record into its plaintext byte payload.
///
/// The buffer is wiped on drop.  Fields larger than `u32::MAX` cannot be
/// produced by a validated record.
pub fn encode(record: &VaultRecord) -> Result<Zeroizing<Vec<u8>>> {
    let fields: Vec<(u8, &str)> = [
        (TAG_TITLE, Some(record.title.as_str())),
        (TAG_USERNAME, Some(record.username.as_str())),
        (TAG_SECRET, Some(record.secret.as_str())),
        (TAG_WEBSITE, record.website_url.as_deref()),
        (TAG_NOTES, record.notes.as_deref()),
        (TAG_CATEGORY, record.category.as_deref()),
    ]
    .into_iter()
    .filter_map(|(tag, value)| value.map(|v| (tag, v)))
    .collect();

    let capacity = 2 + fields.iter().map(|(_, v)| 5 + v.len()).sum::<usize>();
    let mut buf = Zeroizing::new(Vec::with_capacity(capacity));

    buf.push(RECORD_VERSION);
    // At most six known fields, always fits.
    buf.push(fields.len() as u8);

    for (tag, value) in fields {
        let len = u32::try_from(value.len())
            .map_err(|_| VaultError::InvalidInput("record field exceeds u32::MAX bytes".into()))?;
        buf.push(tag);
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(value.as_bytes());
    }

    Ok(buf)
}

/// Decode a plaintext payload back into a record.
pub fn decode(data: &[u8]) -> Result<VaultRecord> {
    let mut reader = ByteReader::new(data, "record");

    let version = reader.u8()?;
    if version != RECORD_VERSION {
        return Err(VaultError::Format(format!(
            "unsupported record version {version}, expected {RECORD_VERSION}"
        )));
    }

    let count = reader.u8()?;

    // Filled in place so a failure half-way still wipes what was read.
    let mut record = VaultRecord::default();
    let mut seen = [false; 7];

    for _ in 0..count {
        let tag = reader.u8()?;
        let len = reader.len_u32()?;
        let bytes = reader.take(len)?;

        if !(TAG_TITLE..=TAG_CATEGORY).contains(&tag) {
            debug!(tag, len, "skipping unknown record field");
            continue;
        }

        let index = usize::from(tag);
        if seen[index] {
            return Err(VaultError::Format(format!("duplicate field tag {tag}")));
        }
        seen[index] = true;

        let value = utf8_field(bytes, tag)?;
        match tag {
            TAG_TITLE => record.title = value,
            TAG_USERNAME => record.username = value,
            TAG_SECRET => record.secret = value,
            TAG_WEBSITE => record.website_url = Some(value),
            TAG_NOTES => record.notes = Some(value),
            // TAG_CATEGORY; the range check above rules out anything else.
            _ => record.category = Some(value),
        }
    }

    reader.finish()?;

    for (tag, name) in [
        (TAG_TITLE, "title"),
        (TAG_USERNAME, "username"),
        (TAG_SECRET, "secret"),
    ] {
        if !seen[usize::from(tag)] {
            return Err(VaultError::Format(format!("missing required field '{name}'")));
        }
    }

    Ok(record)
}

fn utf8_field(bytes: &[u8], tag: u8) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        let mut bad = e.into_bytes();
        bad.zeroize();
        VaultError::Format(format!("field {tag} is not valid UTF-8"))
    })
}
