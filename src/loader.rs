//! Loading of the schema and of catalog documents from disk.

use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, LoadError};

/// Load the schema file.
///
/// # Errors
///
/// Any failure here is a configuration error: the run cannot proceed
/// without a schema.
pub fn load_schema(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::SchemaNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SchemaRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::SchemaJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a catalog document.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound`, `LoadError::ReadError` (including
/// non UTF-8 content), or `LoadError::InvalidJson`.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Heuristic for a JSON Schema that ended up among the catalog documents.
///
/// True for an object carrying both `$schema` and `properties`. A catalog
/// entry that legitimately uses both keys is misclassified; there is no
/// stronger signal available without knowing the catalog layout.
pub fn looks_like_schema(document: &Value) -> bool {
    document
        .as_object()
        .map(|obj| obj.contains_key("$schema") && obj.contains_key("properties"))
        .unwrap_or(false)
}
