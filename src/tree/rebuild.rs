//! Template + value lookup → tree transform.

use toml::Value;

use super::flatten::{classify_placeholder, PlaceholderKind, Template};
use super::{join_path, validate_key, Scalar, Tree, PATH_SEPARATOR};
use crate::errors::{Result, TemplatteError};

/// Rebuild a nested tree from the dotted paths in `template`.
///
/// Leaf entries are filled from `lookup`; a missing value fails the whole
/// rebuild with `MissingValue` instead of producing a partial tree.
/// Mapping entries (`{{{path}}}`) only make sure a table exists at that
/// path, so empty tables survive.
pub fn rebuild<F>(template: &Template, mut lookup: F) -> Result<Tree>
where
    F: FnMut(&str) -> Option<Scalar>,
{
    let mut root = Tree::new();

    for (path, token) in template.iter() {
        let parts: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| TemplatteError::MissingValue(path.to_string()))?;

        let parent = table_at(&mut root, parents)?;
        validate_key(&parents.join("."), last)?;

        match classify_placeholder(path, token) {
            Some(PlaceholderKind::Mapping) => {
                let node = parent
                    .entry(last.to_string())
                    .or_insert(Value::Table(Tree::new()));
                if !node.is_table() {
                    return Err(TemplatteError::PathConflict(path.to_string()));
                }
            }
            _ => {
                if parent.get(*last).is_some_and(Value::is_table) {
                    return Err(TemplatteError::PathConflict(path.to_string()));
                }
                let value =
                    lookup(path).ok_or_else(|| TemplatteError::MissingValue(path.to_string()))?;
                parent.insert(last.to_string(), value.into());
            }
        }
    }

    Ok(root)
}

/// Walk down `parts` from `root`, creating empty tables as needed.
fn table_at<'a>(root: &'a mut Tree, parts: &[&str]) -> Result<&'a mut Tree> {
    let mut current = root;
    let mut walked = String::new();

    for part in parts {
        validate_key(&walked, part)?;
        walked = join_path(&walked, part);

        let node = current
            .entry(part.to_string())
            .or_insert(Value::Table(Tree::new()));
        current = match node {
            Value::Table(table) => table,
            _ => return Err(TemplatteError::PathConflict(walked)),
        };
    }

    Ok(current)
}
