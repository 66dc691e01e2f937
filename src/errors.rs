use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Templatte.
#[derive(Debug, Error)]
pub enum TemplatteError {
    // --- File lifecycle errors ---
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    // --- Crypto errors ---
    #[error("Passphrases not identical, nothing was encrypted")]
    PassphraseMismatch,

    #[error("Cipher failed: {0}")]
    CipherFailure(String),

    #[error("Cipher did not finish within {0}s and was killed")]
    CipherTimeout(u64),

    // --- Template errors ---
    #[error("Malformed template line {line} in {}: {reason}", .path.display())]
    ParseError {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Value '{0}' not found in the value store")]
    MissingValue(String),

    // --- Tree errors ---
    #[error("Invalid key {key:?} at '{path}': {reason}")]
    InvalidKey {
        path: String,
        key: String,
        reason: String,
    },

    #[error("Path '{0}' is used both as a value and as a table")]
    PathConflict(String),

    #[error("Failed to parse {}: {reason}", .path.display())]
    TreeParse { path: PathBuf, reason: String },

    // --- Walk errors ---
    #[error("Walk failed: {0}")]
    WalkFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for Templatte results.
pub type Result<T> = std::result::Result<T, TemplatteError>;
