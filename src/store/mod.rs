//! On-disk artifacts.
//!
//! This module provides:
//! - Template artifacts and nested tree files (`template`)
//! - The shared flat value store (`values`)
//! - Atomic write and suffix helpers shared by both (this file)

pub mod template;
pub mod values;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub use template::{delete, read_template, read_tree, write_template, write_tree};
pub use values::{namespaced_key, ValueStore};

/// Write `contents` to `path` **atomically**.
///
/// The bytes go to a dot-prefixed temp file in the same directory, which
/// is then renamed over the target, so readers never see a half-written
/// file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);
    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Sibling temp path used while producing `path`: `dir/.name.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// `app.toml` + `.latte` → `app.toml.latte`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// `app.toml.latte` - `.latte` → `app.toml`. `None` if the suffix is
/// absent or nothing would remain of the file name.
pub fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}
