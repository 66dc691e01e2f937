//! Configuration tree model and the flatten/rebuild transforms.
//!
//! A tree is a `toml::Table` (insertion-ordered, thanks to the
//! `preserve_order` feature). Every non-table node is a leaf and is
//! carried through the core as a [`Scalar`]:
//! - Tree → dotted-path template + flat values (`flatten`)
//! - Template + value lookup → tree (`rebuild`)

pub mod flatten;
pub mod rebuild;

use toml::value::{Array, Datetime};
use toml::Value;

use crate::errors::{Result, TemplatteError};

pub use flatten::{flatten, Flattened, PlaceholderPolicy, Template};
pub use rebuild::rebuild;

/// A nested configuration tree.
pub type Tree = toml::Table;

/// Separator joining ancestor keys into a dotted path.
pub const PATH_SEPARATOR: char = '.';

/// A leaf value. Arrays are opaque leaves, even arrays of tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Array),
}

impl Scalar {
    /// Convert a TOML value into a leaf. Returns `None` for tables.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s)),
            Value::Integer(i) => Some(Self::Integer(i)),
            Value::Float(f) => Some(Self::Float(f)),
            Value::Boolean(b) => Some(Self::Boolean(b)),
            Value::Datetime(d) => Some(Self::Datetime(d)),
            Value::Array(a) => Some(Self::Array(a)),
            Value::Table(_) => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => Value::String(s),
            Scalar::Integer(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Boolean(b) => Value::Boolean(b),
            Scalar::Datetime(d) => Value::Datetime(d),
            Scalar::Array(a) => Value::Array(a),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Join a parent path and a key into a dotted path.
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{key}")
    }
}

/// Check that a mapping key can be part of a dotted path and of a
/// `path = {{path}}` template line without ambiguity.
pub fn validate_key(parent: &str, key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        Some("key cannot be empty")
    } else if key.contains(PATH_SEPARATOR) {
        Some("key cannot contain '.'")
    } else if key.contains(" = ") {
        Some("key cannot contain ' = '")
    } else if key.contains('\n') || key.contains('\r') {
        Some("key cannot contain a line break")
    } else if key.trim() != key {
        Some("key cannot start or end with whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TemplatteError::InvalidKey {
            path: parent.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
