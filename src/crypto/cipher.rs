//! External symmetric cipher.
//!
//! The actual cryptography is delegated to a separate program (GnuPG by
//! default). The passphrase is fed through the child's stdin and never
//! appears on its command line or on disk.

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::errors::{Result, TemplatteError};

/// Interval between exit-status checks while waiting on the child.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A file-to-file symmetric cipher.
///
/// Implementations must leave `input` untouched and must not create
/// `output` unless they succeed (partial output is cleaned up by the
/// caller either way).
pub trait Cipher {
    fn encrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()>;
    fn decrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()>;
}

/// GnuPG in batch mode with loopback pinentry, AES-256 symmetric.
#[derive(Debug, Clone)]
pub struct GpgCipher {
    program: String,
    timeout: Duration,
}

impl GpgCipher {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn base_args() -> [&'static str; 7] {
        [
            "--batch",
            "--yes",
            "--quiet",
            "--pinentry-mode",
            "loopback",
            "--passphrase-fd",
            "0",
        ]
    }

    /// Spawn the cipher, hand it the passphrase, and wait with a deadline.
    fn run(&self, args: &[&OsStr], passphrase: &str) -> Result<()> {
        tracing::debug!(program = %self.program, "invoking cipher");

        let mut child = Command::new(&self.program)
            .args(Self::base_args())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TemplatteError::CipherFailure(format!("failed to run {}: {e}", self.program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut line = Zeroizing::new(Vec::with_capacity(passphrase.len() + 1));
            line.extend_from_slice(passphrase.as_bytes());
            line.push(b'\n');
            // A child that exits early closes the pipe; its status says why.
            if let Err(e) = stdin.write_all(&line) {
                tracing::debug!(error = %e, "cipher closed stdin early");
            }
        }

        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        let Some(status) = wait_with_deadline(&mut child, self.timeout)? else {
            // Processes the child spawned may still hold stderr open, so
            // the reader is detached instead of joined.
            drop(stderr);
            tracing::warn!(program = %self.program, "cipher timed out");
            return Err(TemplatteError::CipherTimeout(self.timeout.as_secs()));
        };
        let message = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            let message = message.trim();
            Err(TemplatteError::CipherFailure(if message.is_empty() {
                format!("{} exited with {status}", self.program)
            } else {
                message.to_string()
            }))
        }
    }
}

impl Cipher for GpgCipher {
    fn encrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()> {
        self.run(
            &[
                OsStr::new("--symmetric"),
                OsStr::new("--cipher-algo"),
                OsStr::new("AES256"),
                OsStr::new("--output"),
                output.as_os_str(),
                input.as_os_str(),
            ],
            passphrase,
        )
    }

    fn decrypt(&self, input: &Path, output: &Path, passphrase: &str) -> Result<()> {
        self.run(
            &[
                OsStr::new("--output"),
                output.as_os_str(),
                OsStr::new("--decrypt"),
                input.as_os_str(),
            ],
            passphrase,
        )
    }
}

/// Wait for `child` until `timeout` elapses. Returns `None` (after
/// killing the child) if it did not exit in time.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_program_is_a_cipher_failure() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, "x").unwrap();

        let cipher = GpgCipher::new("templatte-no-such-cipher", Duration::from_secs(1));
        let err = cipher
            .encrypt(&input, &dir.path().join("out"), "pw")
            .unwrap_err();
        assert!(matches!(err, TemplatteError::CipherFailure(_)));
    }

    #[cfg(unix)]
    #[test]
    fn slow_child_is_killed_at_deadline() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let started = Instant::now();
        let status = wait_with_deadline(&mut child, Duration::from_millis(100)).unwrap();
        assert!(status.is_none());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_grandchildren() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        // The shell forks `sleep`, which keeps stderr open after the
        // shell itself is killed.
        let program = dir.path().join("slow-cipher");
        std::fs::write(&program, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, "x").unwrap();

        let cipher = GpgCipher::new(
            program.to_string_lossy().into_owned(),
            Duration::from_millis(200),
        );
        let started = Instant::now();
        let err = cipher
            .encrypt(&input, &dir.path().join("out"), "pw")
            .unwrap_err();

        assert!(matches!(err, TemplatteError::CipherTimeout(_)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_cipher_failure() {
        let dir = TempDir::new().unwrap();
        // `false` ignores its arguments and exits 1.
        let cipher = GpgCipher::new("false", Duration::from_secs(5));
        let err = cipher
            .decrypt(&dir.path().join("in"), &dir.path().join("out"), "pw")
            .unwrap_err();
        assert!(matches!(err, TemplatteError::CipherFailure(_)));
    }
}
