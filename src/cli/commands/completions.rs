//! `templatte completions` — generate shell completion scripts.
//!
//! Usage:
//!   templatte completions bash > ~/.local/share/bash-completion/completions/templatte
//!   templatte completions zsh
//!   templatte completions fish

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    io::stdout().write_all(&render(shell))?;
    Ok(())
}

/// Render the completion script for `shell`.
fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, name, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_every_subcommand() {
        let script = String::from_utf8(render(Shell::Bash)).unwrap();
        for sub in ["genelatte", "press", "pour", "grind", "deploy"] {
            assert!(script.contains(sub), "missing {sub}");
        }
    }

    #[test]
    fn fish_script_targets_templatte() {
        let script = String::from_utf8(render(Shell::Fish)).unwrap();
        assert!(script.contains("templatte"));
    }
}
