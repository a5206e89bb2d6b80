//! `fishvault generate`: print a random password and its strength.

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::errors::Result;
use crate::vault::{assess_strength, generate_password};

/// Execute the `generate` command.
pub fn execute(cli: &Cli, length: Option<usize>) -> Result<()> {
    let length = match length {
        Some(len) => len,
        None => load_settings(cli)?.generator_length,
    };

    let password = generate_password(length)?;
    println!("{}", password.as_str());
    output::tip(&format!("Strength: {}", assess_strength(&password).label()));

    Ok(())
}
