//! Error types for catalog validation.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-level failures that stop a run before any document is checked.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("schema not found: {path}")]
    SchemaNotFound { path: PathBuf },

    #[error("cannot read schema {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema {path} is not valid JSON: {source}")]
    SchemaJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("catalog root not found: {path}")]
    CatalogNotFound { path: PathBuf },

    #[error("no JSON files matched the given targets")]
    NoInput,
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading a single catalog document.
///
/// These never abort a batch; they become a failed result for that file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not valid JSON → {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Path of the document that failed to load.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::FileNotFound { path }
            | LoadError::ReadError { path, .. }
            | LoadError::InvalidJson { path, .. } => path,
        }
    }
}

/// Single validation error with location context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Location of the violating node, e.g. `$.contacts[0].email`.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
    /// Failures of the individual alternatives of a `oneOf`/`anyOf`.
    pub subcontext: Vec<ErrorRecord>,
}

impl ErrorRecord {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            subcontext: Vec::new(),
        }
    }

    /// A record anchored at the document root.
    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new("$", message)
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// Machine-readable output carries errors as plain strings.
impl serde::Serialize for ErrorRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
