//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{CryptoGate, GpgCipher, PassphraseSource};
use crate::errors::{Result, TemplatteError};

/// Environment variable consulted before prompting for a passphrase.
pub const PASSPHRASE_ENV: &str = "TEMPLATTE_PASSPHRASE";

/// Config formats `genelatte` knows how to template.
const SUPPORTED_CONFIG_TYPES: &[&str] = &["toml"];

/// Templatte CLI: brew config templates, press the values.
#[derive(Parser)]
#[command(
    name = "templatte",
    about = "Extract config values into an encrypted store and template the originals",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (default: current directory)
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate .latte templates and the templatte.toml value store
    Genelatte {
        /// Config file type to search for (only `toml` for now)
        #[arg(long, default_value = "toml")]
        config_type: String,

        /// Also emit template entries for tables, not only leaves
        #[arg(long)]
        with_mappings: bool,
    },

    /// Encrypt the value store with a passphrase
    Press,

    /// Decrypt the value store with a passphrase
    Pour,

    /// Remove original config files that already have a .latte template
    Grind {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Restore config files from their .latte templates and the value store
    Deploy {
        /// Also print every restored tree
        #[arg(long)]
        print: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load project settings from the workspace root.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&cli.root)
}

/// Build the crypto gate configured by `settings`.
pub fn crypto_gate(settings: &Settings) -> CryptoGate<GpgCipher> {
    CryptoGate::new(
        GpgCipher::new(settings.cipher_program.clone(), settings.cipher_timeout()),
        settings.encrypted_suffix.clone(),
    )
}

/// Check a `--config-type` value against the supported formats.
pub fn validate_config_type(config_type: &str) -> Result<()> {
    if SUPPORTED_CONFIG_TYPES.contains(&config_type) {
        return Ok(());
    }
    Err(TemplatteError::CommandFailed(format!(
        "unsupported config type '{config_type}' (supported: {})",
        SUPPORTED_CONFIG_TYPES.join(", ")
    )))
}

/// Passphrase source used by `press` and `pour`, trying in order:
/// 1. `TEMPLATTE_PASSPHRASE` env var (CI/CD)
/// 2. Interactive hidden prompt
///
/// Every entry is returned as `Zeroizing<String>` so it is wiped from
/// memory on drop.
pub struct Prompter;

impl PassphraseSource for Prompter {
    fn passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
            if !pw.is_empty() {
                return Ok(Zeroizing::new(pw));
            }
        }

        let pw = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(false)
            .interact()
            .map_err(|e| TemplatteError::CommandFailed(format!("passphrase prompt: {e}")))?;
        Ok(Zeroizing::new(pw))
    }
}
