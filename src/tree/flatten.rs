//! Tree → (flat values, template) transform.
//!
//! Traversal is depth-first in the table's own key order. Paths are
//! accumulated by joining ancestor keys with `.`, so the output order is
//! exactly the order keys were read from the source file.

use std::collections::HashMap;

use toml::Value;

use super::{join_path, validate_key, Scalar, Tree};
use crate::errors::Result;

/// Which nodes receive a template entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderPolicy {
    /// Only scalar leaves get an entry.
    #[default]
    LeafOnly,
    /// Tables get an entry too, written before their children.
    WithMappings,
}

/// What a template entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Leaf,
    Mapping,
}

/// Placeholder token for a scalar leaf: `{{path}}`.
pub fn leaf_placeholder(path: &str) -> String {
    format!("{{{{{path}}}}}")
}

/// Placeholder token for a table node: `{{{path}}}`.
pub fn mapping_placeholder(path: &str) -> String {
    format!("{{{{{{{path}}}}}}}")
}

/// Classify `token` as the placeholder of `path`, or `None` if it is
/// not a placeholder for that path at all.
pub fn classify_placeholder(path: &str, token: &str) -> Option<PlaceholderKind> {
    if token == mapping_placeholder(path) {
        Some(PlaceholderKind::Mapping)
    } else if token == leaf_placeholder(path) {
        Some(PlaceholderKind::Leaf)
    } else {
        None
    }
}

/// Ordered list of (dotted path, placeholder token) entries.
///
/// Paths are unique: [`Template::insert`] replaces an existing entry in
/// place. Lookups go through a path → position index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the placeholder for `path`, keeping the
    /// original position on replace.
    pub fn insert(&mut self, path: impl Into<String>, token: impl Into<String>) {
        let path = path.into();
        let token = token.into();
        match self.index.get(&path) {
            Some(&pos) => self.entries[pos].1 = token,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, token));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of flattening one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    /// Dotted path → leaf value, in traversal order.
    pub values: Vec<(String, Scalar)>,
    /// Dotted path → placeholder token, in traversal order.
    pub template: Template,
}

/// Flatten `tree` into its leaf values and its template.
///
/// Fails with `InvalidKey` if any key would make a dotted path
/// ambiguous (empty, contains `.`, etc.).
pub fn flatten(tree: &Tree, policy: PlaceholderPolicy) -> Result<Flattened> {
    let mut out = Flattened::default();
    walk(tree, "", policy, &mut out)?;
    Ok(out)
}

fn walk(table: &Tree, parent: &str, policy: PlaceholderPolicy, out: &mut Flattened) -> Result<()> {
    for (key, value) in table {
        validate_key(parent, key)?;
        let path = join_path(parent, key);

        match value {
            Value::Table(child) => {
                if policy == PlaceholderPolicy::WithMappings {
                    out.template.insert(path.clone(), mapping_placeholder(&path));
                }
                walk(child, &path, policy, out)?;
            }
            leaf => {
                if let Some(scalar) = Scalar::from_value(leaf.clone()) {
                    out.template.insert(path.clone(), leaf_placeholder(&path));
                    out.values.push((path, scalar));
                }
            }
        }
    }
    Ok(())
}
