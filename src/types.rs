//! Core types shared across the validation pipeline.

use serde_json::Value;

/// Base name of directories pruned during catalog traversal.
pub const SCHEMA_DIR_NAME: &str = "schema";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Options for validating catalog documents.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Run the strict semantic checks in addition to the schema.
    pub strict: bool,
    /// Enforce `format` keywords (e.g. `"format": "date"`).
    pub format_check: bool,
}

impl ValidateOptions {
    /// Structural validation with format checking on, strict mode off.
    pub fn new() -> Self {
        Self {
            strict: false,
            format_check: true,
        }
    }

    /// Enable or disable the strict semantic checks.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable `format` assertions.
    pub fn format_check(mut self, format_check: bool) -> Self {
        self.format_check = format_check;
        self
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for collecting candidate files.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Skip directories named `schema` (any case) below a walked root.
    pub prune_schema_dirs: bool,
}

impl CollectOptions {
    pub fn new() -> Self {
        Self {
            prune_schema_dirs: true,
        }
    }

    pub fn prune_schema_dirs(mut self, prune: bool) -> Self {
        self.prune_schema_dirs = prune;
        self
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::new()
    }
}
