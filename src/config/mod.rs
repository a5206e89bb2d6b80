//! Configuration loaded from `.fishvault.toml`.

pub mod settings;

pub use settings::Settings;
