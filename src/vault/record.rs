//! Plaintext credential records and their categories.
//!
//! A `VaultRecord` only ever exists on the device, in memory, while a
//! session is unlocked.  Every field is encrypted before it leaves; there
//! is no plaintext "title" column on the storage side.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, VaultError};

/// Longest accepted value for any single record field, in bytes.
pub const MAX_FIELD_LEN: usize = 64 * 1024;

/// A decrypted credential.
///
/// All text is wiped from memory when the record is dropped.  `Debug`
/// redacts the secret.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct VaultRecord {
    pub title: String,
    pub username: String,
    /// The password (or other secret) being stored.
    pub secret: String,
    pub website_url: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
}

impl VaultRecord {
    /// Build a record with the three required fields.
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            secret: secret.into(),
            website_url: None,
            notes: None,
            category: None,
        }
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website_url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The record's category, falling back to `Category::Other`.
    pub fn category_kind(&self) -> Category {
        self.category
            .as_deref()
            .map_or(Category::Other, Category::from_label)
    }

    /// Check the record is worth storing.
    ///
    /// A title and a secret are required; every field is bounded in size.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(VaultError::InvalidInput("title cannot be empty".into()));
        }
        if self.secret.is_empty() {
            return Err(VaultError::InvalidInput("secret cannot be empty".into()));
        }

        let fields = [
            ("title", Some(self.title.as_str())),
            ("username", Some(self.username.as_str())),
            ("secret", Some(self.secret.as_str())),
            ("website_url", self.website_url.as_deref()),
            ("notes", self.notes.as_deref()),
            ("category", self.category.as_deref()),
        ];
        for (name, value) in fields {
            if value.is_some_and(|v| v.len() > MAX_FIELD_LEN) {
                return Err(VaultError::InvalidInput(format!(
                    "{name} cannot exceed {MAX_FIELD_LEN} bytes"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for VaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultRecord")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .field("website_url", &self.website_url)
            .field("notes", &self.notes.as_ref().map(|_| "[REDACTED]"))
            .field("category", &self.category)
            .finish()
    }
}

/// A decrypted record together with its storage metadata.
#[derive(Debug, Clone)]
pub struct DecryptedItem {
    pub id: String,
    pub record: VaultRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The outcome of decrypting one stored item during a list.
///
/// A corrupt or undecryptable item is reported here instead of failing
/// the whole listing.
#[derive(Debug)]
pub struct ItemResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub record: Result<VaultRecord>,
}

impl ItemResult {
    /// Convert into a `DecryptedItem`, or the per-item error.
    pub fn into_decrypted(self) -> Result<DecryptedItem> {
        let record = self.record?;
        Ok(DecryptedItem {
            id: self.id,
            record,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// The fixed set of categories offered when adding an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    Login,
    Email,
    Social,
    Finance,
    Work,
    Shopping,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Login,
        Category::Email,
        Category::Social,
        Category::Finance,
        Category::Work,
        Category::Shopping,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Login => "Login",
            Category::Email => "Email",
            Category::Social => "Social",
            Category::Finance => "Finance",
            Category::Work => "Work",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// Display glyph for list views.
    pub fn glyph(self) -> &'static str {
        match self {
            Category::Login => "\u{1f510}",
            Category::Email => "\u{1f4e7}",
            Category::Social => "\u{1f4ac}",
            Category::Finance => "\u{1f4b3}",
            Category::Work => "\u{1f4bc}",
            Category::Shopping => "\u{1f6d2}",
            Category::Entertainment => "\u{1f3ae}",
            Category::Other => "\u{1f4c1}",
        }
    }

    /// Case-insensitive lookup; unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_and_notes() {
        let record = VaultRecord::new("Gmail", "a@b.com", "p@ss").with_notes("recovery code 1234");
        let rendered = format!("{record:?}");
        assert!(rendered.contains("Gmail"));
        assert!(!rendered.contains("p@ss"));
        assert!(!rendered.contains("1234"));
    }

    #[test]
    fn validate_requires_title_and_secret() {
        assert!(VaultRecord::new("Gmail", "a@b.com", "p@ss").validate().is_ok());
        assert!(matches!(
            VaultRecord::new("  ", "a@b.com", "p@ss").validate(),
            Err(VaultError::InvalidInput(_))
        ));
        assert!(matches!(
            VaultRecord::new("Gmail", "a@b.com", "").validate(),
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_bounds_field_size() {
        let record =
            VaultRecord::new("Gmail", "a@b.com", "p@ss").with_notes("x".repeat(MAX_FIELD_LEN + 1));
        assert!(matches!(record.validate(), Err(VaultError::InvalidInput(_))));
    }

    #[test]
    fn category_lookup_is_case_insensitive_with_fallback() {
        assert_eq!(Category::from_label("finance"), Category::Finance);
        assert_eq!(Category::from_label(" Email "), Category::Email);
        assert_eq!(Category::from_label("Crypto"), Category::Other);

        let record = VaultRecord::new("Bank", "me", "pw").with_category("FINANCE");
        assert_eq!(record.category_kind(), Category::Finance);
        assert_eq!(VaultRecord::new("x", "y", "z").category_kind(), Category::Other);
    }
}
