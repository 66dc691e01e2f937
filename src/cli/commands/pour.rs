//! `templatte pour` — decrypt the value store with a passphrase.

use crate::cli::output;
use crate::cli::{crypto_gate, load_settings, Cli, Prompter};
use crate::crypto::ArtifactState;
use crate::errors::Result;

/// Execute the `pour` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = settings.value_store_path(&cli.root);
    let gate = crypto_gate(&settings);

    if gate.state(&path) == ArtifactState::Both {
        output::warning(&format!(
            "{} already exists and will be overwritten.",
            path.display()
        ));
    }

    gate.decrypt(&path, &mut Prompter)?;

    output::success(&format!("Poured values into {}", path.display()));
    output::tip("Run `templatte deploy` to restore the config files.");
    Ok(())
}
