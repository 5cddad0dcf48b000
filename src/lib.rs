//! IPF Catalog Validator
//!
//! Validates IPF catalog entries (JSON documents) against the IPF JSON Schema
//! (draft 2020-12), with an optional strict tier of semantic checks.
//!
//! # Example
//!
//! ```
//! use ipf_validate::{CatalogSchema, DocumentValidator, ValidateOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "id": { "type": "string" }
//!     },
//!     "required": ["id"]
//! });
//!
//! let options = ValidateOptions::new();
//! let compiled = CatalogSchema::compile(&schema, &options).unwrap();
//!
//! let errors = compiled.errors(&json!({ "id": 7 }));
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].path, "$.id");
//! ```
//!
//! # Pipeline
//!
//! | Stage | Function |
//! |-------|----------|
//! | Collect candidate files | [`collect_files`] |
//! | Load each document | [`load_document`] |
//! | Schema + strict checks | [`validate_files`] |
//! | Render | [`render_text`] / [`render_json`] |
//!
//! # Exit codes
//!
//! `0` all valid, `1` one or more invalid, `2` configuration error
//! (missing schema or catalog, malformed schema, no input files).

mod collect;
mod error;
mod loader;
mod report;
mod strict;
mod types;
mod validator;

pub use collect::{collect_files, require_roots};
pub use error::{ConfigError, ErrorRecord, LoadError};
pub use loader::{load_document, load_schema, looks_like_schema};
pub use report::{
    render_json, render_text, validate_file, validate_files, FileResult, FileStatus, Summary,
};
pub use strict::{
    check_dates, check_escape_hatches, check_license, check_quality_bounds, strict_issues,
    ACCEPTED_LICENSE, DATE_FIELDS, ESCAPE_HATCH_FIELD, LICENSE_FIELD, QUALITY_FIELD,
    QUALITY_TARGETS,
};
pub use types::{json_type_name, CollectOptions, ValidateOptions, SCHEMA_DIR_NAME};
pub use validator::{CatalogSchema, DocumentValidator};
