//! The shared flat value store (`templatte.toml`).
//!
//! Every extracted leaf lives here under a namespaced key,
//! `"{source-file}_{dotted.path}"`, so two files with the same internal
//! structure never collide. Keys are always written in sorted order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use super::write_atomic;
use crate::errors::{Result, TemplatteError};
use crate::tree::{Scalar, Tree};

/// Build the store key for `dotted_path` inside the file `source`.
pub fn namespaced_key(source: &str, dotted_path: &str) -> String {
    format!("{source}_{dotted_path}")
}

/// Handle to one value-store file.
///
/// Holds the entries in memory; nothing is written until
/// [`ValueStore::merge_write`] is called.
#[derive(Debug, Clone)]
pub struct ValueStore {
    /// Path to the store file on disk.
    path: PathBuf,

    /// Namespaced key → leaf value, kept sorted.
    values: BTreeMap<String, Scalar>,
}

impl ValueStore {
    /// Load an existing store. Fails with `NotFound` if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TemplatteError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let table: Tree = toml::from_str(&content).map_err(|e| TemplatteError::TreeParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in table {
            let scalar = Scalar::from_value(value).ok_or_else(|| TemplatteError::TreeParse {
                path: path.to_path_buf(),
                reason: format!("entry '{key}' is a table, expected a single value"),
            })?;
            values.insert(key, scalar);
        }

        tracing::debug!(path = %path.display(), entries = values.len(), "loaded value store");
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Load the store at `path`, or start an empty one if it does not exist.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                path: path.to_path_buf(),
                values: BTreeMap::new(),
            })
        }
    }

    /// Overlay `entries` on top of whatever is stored at `path` and write
    /// the result sorted by key. Existing keys absent from `entries` are
    /// kept; on collision the new value wins.
    pub fn merge_write(path: &Path, entries: BTreeMap<String, Scalar>) -> Result<Self> {
        let mut store = Self::load_or_empty(path)?;
        let added = entries.len();
        store.values.extend(entries);
        store.save()?;
        tracing::debug!(
            path = %path.display(),
            added,
            total = store.values.len(),
            "merged value store"
        );
        Ok(store)
    }

    /// Serialize every entry, sorted by key, and write atomically.
    fn save(&self) -> Result<()> {
        let mut table = Tree::new();
        for (key, value) in &self.values {
            table.insert(key.clone(), Value::from(value.clone()));
        }
        let rendered =
            toml::to_string(&table).map_err(|e| TemplatteError::Serialization(e.to_string()))?;
        write_atomic(&self.path, rendered.as_bytes())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key)
    }

    /// Look up `dotted_path` as extracted from the file `source`.
    pub fn get_namespaced(&self, source: &str, dotted_path: &str) -> Option<&Scalar> {
        self.values.get(&namespaced_key(source, dotted_path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
