//! `templatte press` — encrypt the value store with a passphrase.
//!
//! Asks for the passphrase twice, runs the external cipher, and removes
//! the plaintext store only once the encrypted copy is in place.

use crate::cli::output;
use crate::cli::{crypto_gate, load_settings, Cli, Prompter};
use crate::crypto::ArtifactState;
use crate::errors::{Result, TemplatteError};

/// Execute the `press` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = settings.value_store_path(&cli.root);
    let gate = crypto_gate(&settings);

    match gate.state(&path) {
        ArtifactState::Ciphertext => {
            output::tip("The value store is already pressed. Run `templatte pour` to decrypt it.");
            return Err(TemplatteError::NotFound(path));
        }
        ArtifactState::Missing => {
            output::tip("Run `templatte genelatte` to create the value store.");
            return Err(TemplatteError::NotFound(path));
        }
        ArtifactState::Both => {
            output::warning("An encrypted value store already exists and will be replaced.");
        }
        ArtifactState::Plaintext => {}
    }

    output::info(
        "Set a passphrase and save it in your secret manager. \
         It is required to decrypt the value store.",
    );
    let encrypted = gate.encrypt(&path, &mut Prompter)?;

    output::success(&format!(
        "Pressed {} into {}",
        path.display(),
        encrypted.display()
    ));
    Ok(())
}
