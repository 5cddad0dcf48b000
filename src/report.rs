//! Batch validation and report rendering.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ErrorRecord;
use crate::loader::{load_document, looks_like_schema};
use crate::strict::strict_issues;
use crate::types::ValidateOptions;
use crate::validator::DocumentValidator;

/// How a checked file ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Ok,
    /// Parsed, but violated the schema or a strict check.
    Invalid,
    /// Could not be read or parsed as JSON.
    LoadFailed,
}

/// Result of validating a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub valid: bool,
    pub errors: Vec<ErrorRecord>,
    #[serde(skip)]
    pub status: FileStatus,
}

/// Result of validating a batch of files.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub checked: usize,
    pub valid: usize,
    pub invalid: usize,
    pub results: Vec<FileResult>,
    /// Files that looked like a JSON Schema and were not scored.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
}

impl Summary {
    fn from_results(results: Vec<FileResult>, skipped: Vec<PathBuf>) -> Self {
        let valid = results.iter().filter(|r| r.valid).count();
        Self {
            checked: results.len(),
            valid,
            invalid: results.len() - valid,
            results,
            skipped,
        }
    }

    /// Returns true if no checked file failed.
    pub fn is_ok(&self) -> bool {
        self.invalid == 0
    }

    /// 0 when every checked file is valid, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_ok() {
            0
        } else {
            1
        }
    }
}

/// Validate one file.
///
/// Returns `None` when the file looks like a schema rather than a catalog
/// entry.
pub fn validate_file(
    file: &Path,
    validator: &dyn DocumentValidator,
    options: &ValidateOptions,
) -> Option<FileResult> {
    let document = match load_document(file) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!(file = %file.display(), error = %e, "document failed to load");
            return Some(FileResult {
                file: file.to_path_buf(),
                valid: false,
                errors: vec![ErrorRecord::at_root(e.to_string())],
                status: FileStatus::LoadFailed,
            });
        }
    };

    if looks_like_schema(&document) {
        tracing::info!(file = %file.display(), "skipping schema-like document");
        return None;
    }

    let mut errors = validator.errors(&document);
    if options.strict {
        errors.extend(strict_issues(&document).into_iter().map(ErrorRecord::at_root));
    }

    let valid = errors.is_empty();
    tracing::debug!(file = %file.display(), errors = errors.len(), "validated");
    Some(FileResult {
        file: file.to_path_buf(),
        valid,
        errors,
        status: if valid {
            FileStatus::Ok
        } else {
            FileStatus::Invalid
        },
    })
}

/// Validate files one at a time, in the order given.
///
/// A file that cannot be loaded is recorded as failed and the batch
/// continues.
pub fn validate_files(
    files: &[PathBuf],
    validator: &dyn DocumentValidator,
    options: &ValidateOptions,
) -> Summary {
    let mut results = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        match validate_file(file, validator, options) {
            Some(result) => results.push(result),
            None => skipped.push(file.clone()),
        }
    }

    Summary::from_results(results, skipped)
}

/// Render the human-readable report.
pub fn render_text(summary: &Summary) -> String {
    let mut out = String::new();

    // Skipped files are interleaved with results in path order.
    let mut skipped = summary.skipped.iter().peekable();
    for result in &summary.results {
        while let Some(file) = skipped.next_if(|file| **file < result.file) {
            push_skip(&mut out, file);
        }
        let file = result.file.display();
        match result.status {
            FileStatus::Ok => out.push_str(&format!("[OK] {}\n", file)),
            FileStatus::LoadFailed => {
                for error in &result.errors {
                    out.push_str(&format!("[ERROR] {}: {}\n", file, error.message));
                }
            }
            FileStatus::Invalid => {
                out.push_str(&format!(
                    "[FAIL] {}: {} error(s)\n",
                    file,
                    result.errors.len()
                ));
                for error in &result.errors {
                    out.push_str(&format!("  - at {}: {}\n", error.path, error.message));
                    for sub in &error.subcontext {
                        out.push_str(&format!("      ↳ {}\n", sub.message));
                    }
                }
            }
        }
    }
    for file in skipped {
        push_skip(&mut out, file);
    }

    out.push('\n');
    if summary.is_ok() {
        out.push_str(&format!(
            "[OK] {} file(s) checked, all valid\n",
            summary.checked
        ));
    } else {
        out.push_str(&format!(
            "[FAIL] {} file(s) checked: {} valid, {} invalid\n",
            summary.checked, summary.valid, summary.invalid
        ));
    }
    out
}

fn push_skip(out: &mut String, file: &Path) {
    out.push_str(&format!(
        "[SKIP] {}: looks like a JSON Schema, not a catalog entry\n",
        file.display()
    ));
}

/// Render the machine-readable summary.
pub fn render_json(summary: &Summary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    /// Flags documents without an `id`.
    struct RequireId;

    impl DocumentValidator for RequireId {
        fn errors(&self, document: &Value) -> Vec<ErrorRecord> {
            if document.get("id").is_some() {
                Vec::new()
            } else {
                vec![ErrorRecord::at_root("\"id\" is a required property")]
            }
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn counts_add_up() {
        let dir = tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.json", r#"{"id": "a"}"#),
            write(dir.path(), "b.json", r#"{"name": "b"}"#),
            write(dir.path(), "c.json", "{ broken"),
        ];

        let summary = validate_files(&files, &RequireId, &ValidateOptions::default());
        assert_eq!(summary.checked, 3);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 2);
        assert_eq!(summary.checked, summary.valid + summary.invalid);
        assert_eq!(summary.checked, summary.results.len());
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.results[2].status, FileStatus::LoadFailed);
        assert_eq!(summary.results[2].errors.len(), 1);
    }

    #[test]
    fn malformed_file_does_not_stop_batch() {
        let dir = tempdir().unwrap();
        let mut files: Vec<PathBuf> = (0..9)
            .map(|i| write(dir.path(), &format!("ok{i}.json"), r#"{"id": "x"}"#))
            .collect();
        files.insert(4, write(dir.path(), "broken.json", r#"{"id": "#));

        let summary = validate_files(&files, &RequireId, &ValidateOptions::default());
        assert_eq!(summary.checked, 10);
        assert_eq!(summary.valid, 9);
        assert_eq!(summary.invalid, 1);
    }

    #[test]
    fn schema_lookalikes_are_not_counted() {
        let dir = tempdir().unwrap();
        let files = vec![
            write(dir.path(), "entry.json", r#"{"id": "a"}"#),
            write(
                dir.path(),
                "leaked.json",
                r#"{"$schema": "https://json-schema.org/draft/2020-12/schema", "properties": {}}"#,
            ),
        ];

        let summary = validate_files(&files, &RequireId, &ValidateOptions::default());
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.valid, 1);
        assert_eq!(summary.skipped, vec![files[1].clone()]);
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn strict_issues_join_error_list() {
        let dir = tempdir().unwrap();
        let files = vec![write(dir.path(), "a.json", r#"{"id": "a"}"#)];

        let relaxed = validate_files(&files, &RequireId, &ValidateOptions::new());
        assert!(relaxed.is_ok());

        let strict = validate_files(&files, &RequireId, &ValidateOptions::new().strict(true));
        assert_eq!(strict.invalid, 1);
        assert!(strict.results[0].errors[0].message.contains("_license"));
    }

    #[test]
    fn text_report_layout() {
        let summary = Summary::from_results(
            vec![
                FileResult {
                    file: PathBuf::from("catalog/good.json"),
                    valid: true,
                    errors: vec![],
                    status: FileStatus::Ok,
                },
                FileResult {
                    file: PathBuf::from("catalog/bad.json"),
                    valid: false,
                    errors: vec![ErrorRecord {
                        path: "$.contact".into(),
                        message: "not valid under any of the schemas".into(),
                        subcontext: vec![ErrorRecord::new("$.contact", "not a string")],
                    }],
                    status: FileStatus::Invalid,
                },
            ],
            vec![],
        );

        let text = render_text(&summary);
        assert!(text.contains("[OK] catalog/good.json\n"));
        assert!(text.contains("[FAIL] catalog/bad.json: 1 error(s)\n"));
        assert!(text.contains("  - at $.contact: not valid under any of the schemas\n"));
        assert!(text.contains("      ↳ not a string\n"));
        assert!(text.ends_with("[FAIL] 2 file(s) checked: 1 valid, 1 invalid\n"));
    }

    #[test]
    fn skipped_files_keep_their_position() {
        let dir = tempdir().unwrap();
        let schema_like =
            r#"{"$schema": "https://json-schema.org/draft/2020-12/schema", "properties": {}}"#;
        let files = vec![
            write(dir.path(), "a.json", r#"{"id": "a"}"#),
            write(dir.path(), "b.json", schema_like),
            write(dir.path(), "c.json", r#"{"id": "c"}"#),
            write(dir.path(), "d.json", schema_like),
        ];

        let summary = validate_files(&files, &RequireId, &ValidateOptions::default());
        assert_eq!(summary.checked, 2);

        let text = render_text(&summary);
        let order: Vec<&str> = ["a.json", "b.json", "c.json", "d.json"]
            .iter()
            .map(|name| {
                text.lines()
                    .find(|line| line.contains(*name))
                    .unwrap()
            })
            .collect();
        assert!(order[0].starts_with("[OK]"));
        assert!(order[1].starts_with("[SKIP]"));
        assert!(order[2].starts_with("[OK]"));
        assert!(order[3].starts_with("[SKIP]"));
        let positions: Vec<usize> = order
            .iter()
            .map(|line| text.find(*line).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn json_report_contract() {
        let dir = tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.json", r#"{"id": "a"}"#),
            write(dir.path(), "b.json", r#"{}"#),
        ];
        let summary = validate_files(&files, &RequireId, &ValidateOptions::default());

        let parsed: Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();
        assert_eq!(parsed["checked"], 2);
        assert_eq!(parsed["valid"], 1);
        assert_eq!(parsed["invalid"], 1);
        assert_eq!(parsed["results"][0]["valid"], true);
        assert_eq!(parsed["results"][1]["errors"], json!(["$: \"id\" is a required property"]));
        assert!(parsed.get("skipped").is_none());
        assert!(parsed["results"][0].get("status").is_none());
    }
}
