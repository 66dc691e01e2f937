//! Integration tests for the crypto gate around the value store.
//!
//! The real cipher is an external program, so these tests plug in small
//! in-process ciphers and scripted passphrases.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use templatte::crypto::{ArtifactState, Cipher, CryptoGate, PassphraseSource};
use templatte::errors::{Result, TemplatteError};
use tempfile::TempDir;
use zeroize::Zeroizing;

/// Reversible cipher: prefixes the passphrase, and checks it on decrypt.
struct TaggingCipher;

impl Cipher for TaggingCipher {
    fn encrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()> {
        let mut data = format!("{passphrase}\n").into_bytes();
        data.extend(fs::read(input)?);
        fs::write(output, data)?;
        Ok(())
    }

    fn decrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()> {
        let data = fs::read(input)?;
        let prefix = format!("{passphrase}\n");
        match data.strip_prefix(prefix.as_bytes()) {
            Some(plain) => {
                fs::write(output, plain)?;
                Ok(())
            }
            None => Err(TemplatteError::CipherFailure("bad passphrase".into())),
        }
    }
}

/// Writes half an output file, then fails.
struct BrokenCipher;

impl Cipher for BrokenCipher {
    fn encrypt(&self, _input: &Path, output: &Path, _passphrase: &str) -> Result<()> {
        fs::write(output, b"partial")?;
        Err(TemplatteError::CipherFailure("disk on fire".into()))
    }

    fn decrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()> {
        self.encrypt(input, output, passphrase)
    }
}

/// Counts calls and hands back scripted entries.
struct Scripted {
    entries: Vec<&'static str>,
    asked: Cell<usize>,
}

impl Scripted {
    fn new(entries: &[&'static str]) -> Self {
        Self {
            entries: entries.to_vec(),
            asked: Cell::new(0),
        }
    }
}

impl PassphraseSource for Scripted {
    fn passphrase(&mut self, _prompt: &str) -> Result<Zeroizing<String>> {
        let i = self.asked.get();
        self.asked.set(i + 1);
        self.entries
            .get(i)
            .map(|s| Zeroizing::new(s.to_string()))
            .ok_or(TemplatteError::UserCancelled)
    }
}

const STORE: &str = "\"app.toml_db.host\" = \"localhost\"\n\"app.toml_db.port\" = 5432\n";

fn store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("templatte.toml");
    fs::write(&path, STORE).unwrap();
    (dir, path)
}

/// No stray temp files next to the store.
fn assert_no_leftovers(dir: &TempDir) {
    for entry in fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name();
        assert!(
            !name.to_string_lossy().ends_with(".tmp"),
            "leftover temp file {name:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Mutually exclusive artifacts
// ---------------------------------------------------------------------------

#[test]
fn press_and_pour_swap_artifacts() {
    let (dir, path) = store_path();
    let gate = CryptoGate::new(TaggingCipher, ".gpg");
    let encrypted = dir.path().join("templatte.toml.gpg");

    let mut entries = Scripted::new(&["s3cret", "s3cret"]);
    assert_eq!(gate.encrypt(&path, &mut entries).unwrap(), encrypted);
    assert_eq!(entries.asked.get(), 2);
    assert!(!path.exists());
    assert!(encrypted.exists());

    let mut entry = Scripted::new(&["s3cret"]);
    gate.decrypt(&path, &mut entry).unwrap();
    assert_eq!(entry.asked.get(), 1);
    assert!(path.exists());
    assert!(!encrypted.exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), STORE);
    assert_no_leftovers(&dir);
}

#[test]
fn mismatched_confirmation_touches_nothing() {
    let (dir, path) = store_path();
    let gate = CryptoGate::new(TaggingCipher, ".gpg");

    let err = gate
        .encrypt(&path, &mut Scripted::new(&["s3cret", "s3cr3t"]))
        .unwrap_err();

    assert!(matches!(err, TemplatteError::PassphraseMismatch));
    assert_eq!(fs::read_to_string(&path).unwrap(), STORE);
    assert_eq!(gate.state(&path), ArtifactState::Plaintext);
    assert_no_leftovers(&dir);
}

#[test]
fn wrong_passphrase_keeps_ciphertext() {
    let (_dir, path) = store_path();
    let gate = CryptoGate::new(TaggingCipher, ".gpg");
    gate.encrypt(&path, &mut Scripted::new(&["right", "right"]))
        .unwrap();

    let err = gate
        .decrypt(&path, &mut Scripted::new(&["wrong"]))
        .unwrap_err();

    assert!(matches!(err, TemplatteError::CipherFailure(_)));
    assert_eq!(gate.state(&path), ArtifactState::Ciphertext);
}

#[test]
fn cipher_failure_cleans_partial_output() {
    let (dir, path) = store_path();
    let gate = CryptoGate::new(BrokenCipher, ".gpg");

    let err = gate
        .encrypt(&path, &mut Scripted::new(&["pw", "pw"]))
        .unwrap_err();

    assert!(matches!(err, TemplatteError::CipherFailure(ref m) if m == "disk on fire"));
    assert_eq!(gate.state(&path), ArtifactState::Plaintext);
    assert_no_leftovers(&dir);
}

#[test]
fn custom_suffix_is_respected() {
    let (dir, path) = store_path();
    let gate = CryptoGate::new(TaggingCipher, ".enc");

    gate.encrypt(&path, &mut Scripted::new(&["pw", "pw"]))
        .unwrap();

    assert!(dir.path().join("templatte.toml.enc").exists());
    assert!(!dir.path().join("templatte.toml.gpg").exists());
}

// ---------------------------------------------------------------------------
// Missing artifacts
// ---------------------------------------------------------------------------

#[test]
fn press_without_store_asks_nothing() {
    let dir = TempDir::new().unwrap();
    let gate = CryptoGate::new(TaggingCipher, ".gpg");
    let mut entries = Scripted::new(&["pw", "pw"]);

    let err = gate
        .encrypt(&dir.path().join("templatte.toml"), &mut entries)
        .unwrap_err();

    assert!(matches!(err, TemplatteError::NotFound(_)));
    assert_eq!(entries.asked.get(), 0);
}

#[test]
fn pour_without_ciphertext_is_not_found() {
    let (_dir, path) = store_path();
    let gate = CryptoGate::new(TaggingCipher, ".gpg");

    let err = gate
        .decrypt(&path, &mut Scripted::new(&["pw"]))
        .unwrap_err();

    assert!(matches!(err, TemplatteError::NotFound(_)));
    assert_eq!(gate.state(&path), ArtifactState::Plaintext);
}
