use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TemplatteError};
use crate::tree::PlaceholderPolicy;

/// Project-level configuration, loaded from `.templatte.toml`.
///
/// Every field defaults to the standard naming convention, so Templatte
/// works out-of-the-box without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File name of the shared value store at the workspace root.
    #[serde(default = "default_value_store")]
    pub value_store: String,

    /// Extension (without the dot) of the config files to extract.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Suffix appended to a source path to name its template artifact.
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,

    /// Suffix appended to the value store to name its encrypted form.
    #[serde(default = "default_encrypted_suffix")]
    pub encrypted_suffix: String,

    /// File names never extracted (project manifests and the like).
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Emit `{{{path}}}` entries for tables as well as for leaves.
    #[serde(default)]
    pub mapping_placeholders: bool,

    /// Keep walking after a per-file failure and report all failures at the end.
    #[serde(default = "default_keep_going")]
    pub keep_going: bool,

    /// External program used to encrypt and decrypt the value store.
    #[serde(default = "default_cipher_program")]
    pub cipher_program: String,

    /// Seconds the cipher may run before it is killed.
    #[serde(default = "default_cipher_timeout_secs")]
    pub cipher_timeout_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_value_store() -> String {
    "templatte.toml".to_string()
}

fn default_extension() -> String {
    "toml".to_string()
}

fn default_template_suffix() -> String {
    ".latte".to_string()
}

fn default_encrypted_suffix() -> String {
    ".gpg".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["pyproject.toml".to_string(), "Cargo.toml".to_string()]
}

fn default_keep_going() -> bool {
    true
}

fn default_cipher_program() -> String {
    "gpg".to_string()
}

fn default_cipher_timeout_secs() -> u64 {
    60
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            value_store: default_value_store(),
            extension: default_extension(),
            template_suffix: default_template_suffix(),
            encrypted_suffix: default_encrypted_suffix(),
            exclude: default_exclude(),
            mapping_placeholders: false,
            keep_going: default_keep_going(),
            cipher_program: default_cipher_program(),
            cipher_timeout_secs: default_cipher_timeout_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the workspace root.
    pub const FILE_NAME: &'static str = ".templatte.toml";

    /// Load settings from `<root>/.templatte.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            TemplatteError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let non_empty = [
            ("value_store", &self.value_store),
            ("extension", &self.extension),
            ("template_suffix", &self.template_suffix),
            ("encrypted_suffix", &self.encrypted_suffix),
            ("cipher_program", &self.cipher_program),
        ];
        for (field, value) in non_empty {
            if value.trim().is_empty() {
                return Err(TemplatteError::ConfigError(format!(
                    "'{field}' cannot be empty"
                )));
            }
        }
        if self.cipher_timeout_secs == 0 {
            return Err(TemplatteError::ConfigError(
                "'cipher_timeout_secs' must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the shared value store: `<root>/templatte.toml`.
    pub fn value_store_path(&self, root: &Path) -> PathBuf {
        root.join(&self.value_store)
    }

    /// Whether a file name is never extracted.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        file_name == self.value_store
            || file_name == Self::FILE_NAME
            || self.exclude.iter().any(|e| e == file_name)
    }

    /// Whether a file name is an extractable config file.
    pub fn is_source(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!(".{}", self.extension)) && !self.is_excluded(file_name)
    }

    /// Suffix of restorable template artifacts, e.g. `.toml.latte`.
    pub fn restorable_suffix(&self) -> String {
        format!(".{}{}", self.extension, self.template_suffix)
    }

    pub fn placeholder_policy(&self) -> PlaceholderPolicy {
        if self.mapping_placeholders {
            PlaceholderPolicy::WithMappings
        } else {
            PlaceholderPolicy::LeafOnly
        }
    }

    pub fn cipher_timeout(&self) -> Duration {
        Duration::from_secs(self.cipher_timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
