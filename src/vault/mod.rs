//! Vault module: plaintext records and the operations over them.
//!
//! This module provides:
//! - `VaultRecord`, `Category` and the decrypted item types (`record`)
//! - The versioned binary plaintext encoding (`codec`)
//! - Password generation and strength assessment (`generator`)
//! - `VaultService`, the per-user CRUD + search API (`service`)

pub mod codec;
pub mod generator;
pub mod record;
pub mod service;

// Re-export the most commonly used items.
pub use generator::{assess_strength, generate_password, Strength};
pub use record::{Category, DecryptedItem, ItemResult, VaultRecord};
pub use service::VaultService;
