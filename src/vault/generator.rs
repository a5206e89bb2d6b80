//! Random password generation and a simple strength meter.

use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Characters drawn from when generating a password.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 16;

/// Shortest password the generator will produce.
pub const MIN_LENGTH: usize = 8;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 256;

/// Minimum master password length accepted at signup.
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Generate a random password of `length` characters.
///
/// Each character is drawn uniformly from `CHARSET` using the thread-local
/// CSPRNG (reseeded from the OS).
pub fn generate_password(length: usize) -> Result<Zeroizing<String>> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(VaultError::InvalidInput(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH} (got {length})"
        )));
    }

    let mut rng = rand::rng();
    let mut password = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        let idx = rng.random_range(0..CHARSET.len());
        password.push(char::from(CHARSET[idx]));
    }
    Ok(password)
}

/// Rough password strength buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    TooShort,
    Good,
    Strong,
}

impl Strength {
    pub fn label(self) -> &'static str {
        match self {
            Strength::TooShort => "Too short",
            Strength::Good => "Good",
            Strength::Strong => "Strong",
        }
    }
}

/// Classify a password.
///
/// Under 8 characters is too short.  12 or more characters including an
/// uppercase letter and a digit is strong.  Everything else is good.
pub fn assess_strength(password: &str) -> Strength {
    let len = password.chars().count();
    if len < MIN_MASTER_PASSWORD_LEN {
        return Strength::TooShort;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if len >= 12 && has_upper && has_digit {
        Strength::Strong
    } else {
        Strength::Good
    }
}
