//! Template artifacts and nested tree files.
//!
//! A template artifact has one line per template entry:
//!
//! ```text
//! db.host = {{db.host}}
//! db.port = {{db.port}}
//! ```
//!
//! Table entries (when enabled) use a triple-brace token: `db = {{{db}}}`.

use std::fs;
use std::path::Path;

use super::write_atomic;
use crate::errors::{Result, TemplatteError};
use crate::tree::flatten::classify_placeholder;
use crate::tree::{Template, Tree};

/// Separator between path and token on a template line.
const LINE_SEPARATOR: &str = " = ";

/// Write `template` to `path`, one `key = token` line per entry in
/// iteration order. Overwrites unconditionally.
pub fn write_template(template: &Template, path: &Path) -> Result<()> {
    let mut buf = String::new();
    for (key, token) in template.iter() {
        buf.push_str(key);
        buf.push_str(LINE_SEPARATOR);
        buf.push_str(token);
        buf.push('\n');
    }
    write_atomic(path, buf.as_bytes())?;
    tracing::debug!(path = %path.display(), entries = template.len(), "wrote template");
    Ok(())
}

/// Read a template artifact.
///
/// Lines without `=` are skipped. A line with `=` must be exactly
/// `path = token` where `token` is the placeholder for `path`, and each
/// path may appear once.
pub fn read_template(path: &Path) -> Result<Template> {
    if !path.exists() {
        return Err(TemplatteError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;

    let mut template = Template::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if !trimmed.contains('=') {
            continue;
        }

        let parse_error = |reason: &str| TemplatteError::ParseError {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };

        // Paths never contain the separator, but may end in ` =`; the
        // token never contains it either, so split on the last one.
        let (key, token) = trimmed
            .rsplit_once(LINE_SEPARATOR)
            .ok_or_else(|| parse_error("expected `path = {{path}}`"))?;
        let key = key.trim();
        let token = token.trim();

        if key.is_empty() {
            return Err(parse_error("empty path"));
        }
        if classify_placeholder(key, token).is_none() {
            return Err(parse_error(&format!(
                "placeholder '{token}' does not match path '{key}'"
            )));
        }
        if template.get(key).is_some() {
            return Err(parse_error(&format!("duplicate path '{key}'")));
        }

        template.insert(key, token);
    }

    Ok(template)
}

/// Read a nested tree from a structured config file.
pub fn read_tree(path: &Path) -> Result<Tree> {
    if !path.exists() {
        return Err(TemplatteError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| TemplatteError::TreeParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write `tree` to `path`, merged over whatever tree is already there.
///
/// Top-level keys of the existing file survive unless `tree` supplies
/// the same key. The merged tree is written with top-level keys sorted.
pub fn write_tree(tree: &Tree, path: &Path) -> Result<()> {
    let mut merged = if path.exists() {
        read_tree(path)?
    } else {
        Tree::new()
    };

    for (key, value) in tree {
        merged.insert(key.clone(), value.clone());
    }

    let mut keys: Vec<String> = merged.keys().cloned().collect();
    keys.sort();
    let mut sorted = Tree::new();
    for key in keys {
        if let Some(value) = merged.remove(&key) {
            sorted.insert(key, value);
        }
    }

    let rendered =
        toml::to_string(&sorted).map_err(|e| TemplatteError::Serialization(e.to_string()))?;
    write_atomic(path, rendered.as_bytes())?;
    tracing::debug!(path = %path.display(), keys = sorted.len(), "wrote tree");
    Ok(())
}

/// Remove `path` if present. Returns whether a file was removed.
pub fn delete(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
