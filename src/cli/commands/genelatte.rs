//! `templatte genelatte` — template every config file and collect its values.

use crate::cli::output;
use crate::cli::{load_settings, validate_config_type, Cli};
use crate::errors::Result;
use crate::workspace::{self, failures_to_error};

/// Execute the `genelatte` command.
pub fn execute(cli: &Cli, config_type: &str, with_mappings: bool) -> Result<()> {
    validate_config_type(config_type)?;

    let mut settings = load_settings(cli)?;
    settings.extension = config_type.to_string();
    if with_mappings {
        settings.mapping_placeholders = true;
    }

    let report = workspace::extract(&cli.root, &settings)?;

    for file in &report.files {
        output::info(&format!(
            "Processing file: {} ({} values → {})",
            file.source.display(),
            file.values,
            file.template.display()
        ));
    }
    for failure in &report.failures {
        output::warning(&format!(
            "Skipped {}: {}",
            failure.path.display(),
            failure.error
        ));
    }

    output::success(&format!(
        "Templated {} files; {} values stored in {}",
        report.files.len(),
        report.stored,
        report.value_store.display()
    ));

    if let Some(err) = failures_to_error(&report.failures) {
        return Err(err);
    }

    output::tip("Run `templatte press` to encrypt the value store.");
    output::tip("Run `templatte grind` to remove the original config files.");
    Ok(())
}
