//! `templatte deploy` — rebuild config files from templates and values.

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::errors::{Result, TemplatteError};
use crate::workspace::{self, failures_to_error};

/// Execute the `deploy` command.
pub fn execute(cli: &Cli, print: bool) -> Result<()> {
    let settings = load_settings(cli)?;

    let path = settings.value_store_path(&cli.root);
    if !path.exists() {
        let encrypted = crate::store::append_suffix(&path, &settings.encrypted_suffix);
        if encrypted.exists() {
            output::tip("The value store is pressed. Run `templatte pour` first.");
        }
        return Err(TemplatteError::NotFound(path));
    }

    let report = workspace::deploy(&cli.root, &settings)?;

    output::print_restored_table(&report.restored);

    if print {
        for file in &report.restored {
            let rendered = toml::to_string_pretty(&file.tree)
                .map_err(|e| TemplatteError::Serialization(e.to_string()))?;
            println!("# {}\n{rendered}", file.path.display());
        }
    }

    for failure in &report.failures {
        output::warning(&format!(
            "Not restored {}: {}",
            failure.path.display(),
            failure.error
        ));
    }

    if let Some(err) = failures_to_error(&report.failures) {
        return Err(err);
    }

    if !report.restored.is_empty() {
        output::success(&format!(
            "Deployed {} config files",
            report.restored.len()
        ));
    }
    Ok(())
}
