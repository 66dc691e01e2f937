//! Plaintext ⇄ ciphertext transitions of the value store.
//!
//! The plaintext store and its encrypted twin are mutually exclusive:
//! every successful transition produces one and then removes the other.
//! Output is produced into a temp file and renamed into place before the
//! source is removed, so a failure never leaves both absent.

use std::fs;
use std::path::{Path, PathBuf};

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::cipher::Cipher;
use crate::errors::{Result, TemplatteError};
use crate::store::{append_suffix, temp_path};

/// Where passphrases come from (interactive prompt, env var, tests).
pub trait PassphraseSource {
    /// Ask for one passphrase entry. The returned value is wiped on drop.
    fn passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// Which forms of the value store are currently on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Plaintext,
    Ciphertext,
    /// Both present, e.g. after a crash or a manual copy.
    Both,
    Missing,
}

/// Wraps a [`Cipher`] with the plaintext/ciphertext lifecycle rules.
pub struct CryptoGate<C> {
    cipher: C,
    suffix: String,
}

impl<C: Cipher> CryptoGate<C> {
    pub fn new(cipher: C, suffix: impl Into<String>) -> Self {
        Self {
            cipher,
            suffix: suffix.into(),
        }
    }

    /// `templatte.toml` → `templatte.toml.gpg`.
    pub fn encrypted_path(&self, path: &Path) -> PathBuf {
        append_suffix(path, &self.suffix)
    }

    pub fn state(&self, path: &Path) -> ArtifactState {
        match (path.exists(), self.encrypted_path(path).exists()) {
            (true, false) => ArtifactState::Plaintext,
            (false, true) => ArtifactState::Ciphertext,
            (true, true) => ArtifactState::Both,
            (false, false) => ArtifactState::Missing,
        }
    }

    /// Encrypt `path` into `{path}{suffix}` and remove the plaintext.
    ///
    /// Asks for the passphrase twice; a mismatch aborts before anything
    /// on disk is touched. Returns the path of the encrypted artifact.
    pub fn encrypt(&self, path: &Path, source: &mut dyn PassphraseSource) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(TemplatteError::NotFound(path.to_path_buf()));
        }

        let passphrase = source.passphrase("Passphrase")?;
        let confirmation = source.passphrase("Confirm passphrase")?;
        let matches: bool = passphrase
            .as_bytes()
            .ct_eq(confirmation.as_bytes())
            .into();
        drop(confirmation);
        if !matches {
            return Err(TemplatteError::PassphraseMismatch);
        }

        let target = self.encrypted_path(path);
        self.transition(path, &target, |input, output| {
            let result = self.cipher.encrypt(input, output, &passphrase);
            drop(passphrase);
            result
        })?;

        tracing::debug!(from = %path.display(), to = %target.display(), "encrypted");
        Ok(target)
    }

    /// Decrypt `{path}{suffix}` back into `path` and remove the ciphertext.
    pub fn decrypt(&self, path: &Path, source: &mut dyn PassphraseSource) -> Result<()> {
        let encrypted = self.encrypted_path(path);
        if !encrypted.is_file() {
            return Err(TemplatteError::NotFound(encrypted));
        }

        let passphrase = source.passphrase("Passphrase")?;
        self.transition(&encrypted, path, |input, output| {
            let result = self.cipher.decrypt(input, output, &passphrase);
            drop(passphrase);
            result
        })?;

        tracing::debug!(from = %encrypted.display(), to = %path.display(), "decrypted");
        Ok(())
    }

    /// Run `step` from `from` into a temp sibling of `to`, then move the
    /// result into place and remove `from`.
    fn transition<F>(&self, from: &Path, to: &Path, step: F) -> Result<()>
    where
        F: FnOnce(&Path, &Path) -> Result<()>,
    {
        let tmp = temp_path(to);
        if let Err(e) = step(from, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if !tmp.is_file() {
            return Err(TemplatteError::CipherFailure(format!(
                "cipher reported success but wrote no output for {}",
                from.display()
            )));
        }
        if let Err(e) = fs::rename(&tmp, to) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::remove_file(from)?;
        Ok(())
    }
}
