use std::path::PathBuf;

use thiserror::Error;

use crate::coerce::CoerceError;

#[derive(Debug, Error)]
pub enum InimapError {
    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("Failed to parse {origin} (line {line}): {reason}")]
    ParseError {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error("Cannot convert value of '{key}': {source}")]
    Coercion { key: String, source: CoerceError },

    #[error("Section '{key}' cannot be placed inside another section")]
    NestedSection { key: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Type {0} cannot be instantiated")]
    NotInstantiable(&'static str),

    #[error("No persist path configured; call .persist_path() on the builder")]
    NoPersistPath,

    #[error("App name is required; call .app_name() on the builder")]
    AppNameRequired,
}

impl InimapError {
    /// Whether this error belongs to the I/O failure kind (missing, unreadable,
    /// unwritable, or not a regular file).
    pub fn is_io(&self) -> bool {
        matches!(self, Self::IoError { .. } | Self::NotAFile { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}
