//! `templatte grind` — remove originals that already have a template.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::errors::{Result, TemplatteError};
use crate::workspace;

/// Execute the `grind` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let candidates = workspace::cleanup_candidates(&cli.root, &settings)?;

    if candidates.is_empty() {
        output::info("Nothing to grind: no original has a .latte template.");
        return Ok(());
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {} original config file(s)?",
                candidates.len()
            ))
            .default(false)
            .interact()
            .map_err(|e| TemplatteError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = workspace::cleanup(&cli.root, &settings)?;
    for path in &removed {
        output::info(&format!("Removing file: {}", path.display()));
    }
    output::success(&format!("Ground {} original config files", removed.len()));

    Ok(())
}
