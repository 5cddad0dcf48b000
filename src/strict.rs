//! Strict-mode semantic checks.
//!
//! Each check is a pure function over a parsed document that returns the
//! issues it found. All checks always run and their issues are concatenated.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::types::json_type_name;

/// Fields that must hold an ISO calendar date when present.
pub const DATE_FIELDS: &[&str] = &["date_created", "last_updated", "last_reviewed"];

/// Field holding the list of escape-hatch records.
pub const ESCAPE_HATCH_FIELD: &str = "escape_hatches";

/// Object holding the quality targets.
pub const QUALITY_FIELD: &str = "quality_metrics";

/// Quality targets that must lie in `[0.0, 1.0]`.
pub const QUALITY_TARGETS: &[&str] = &["precision_target", "recall_target", "false_alarm_target"];

/// Field carrying the license tag.
pub const LICENSE_FIELD: &str = "_license";

/// The only accepted license tag.
pub const ACCEPTED_LICENSE: &str = "CC-BY-4.0";

/// Kind reported for escape-hatch records without a tag.
const UNKNOWN_KIND: &str = "unknown";

/// Run every strict check and concatenate their issues.
pub fn strict_issues(document: &Value) -> Vec<String> {
    let mut issues = check_dates(document);
    issues.extend(check_escape_hatches(document));
    issues.extend(check_quality_bounds(document));
    issues.extend(check_license(document));
    issues
}

/// Date-bearing fields must be `YYYY-MM-DD` strings naming a real day.
pub fn check_dates(document: &Value) -> Vec<String> {
    DATE_FIELDS
        .iter()
        .filter_map(|&field| {
            let value = document.get(field)?;
            match value.as_str() {
                Some(s) if is_iso_date(s) => None,
                _ => Some(format!(
                    "{} must be an ISO date (YYYY-MM-DD), got {}",
                    field, value
                )),
            }
        })
        .collect()
}

/// Exactly `DDDD-DD-DD` in ASCII digits, naming a real calendar day.
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Escape hatches should not all share a single kind.
pub fn check_escape_hatches(document: &Value) -> Vec<String> {
    let Some(hatches) = document.get(ESCAPE_HATCH_FIELD) else {
        return Vec::new();
    };
    let Value::Array(records) = hatches else {
        return vec![format!(
            "{} must be an array, got {}",
            ESCAPE_HATCH_FIELD,
            json_type_name(hatches)
        )];
    };

    let kinds: BTreeSet<&str> = records.iter().map(hatch_kind).collect();
    if records.len() >= 2 && kinds.len() == 1 {
        let kind = kinds.into_iter().next().unwrap_or(UNKNOWN_KIND);
        return vec![format!(
            "{}: all {} records share kind \"{}\"; consider diversifying escape hatches",
            ESCAPE_HATCH_FIELD,
            records.len(),
            kind
        )];
    }
    Vec::new()
}

fn hatch_kind(record: &Value) -> &str {
    record
        .get("kind")
        .and_then(Value::as_str)
        .or_else(|| record.get("type").and_then(Value::as_str))
        .unwrap_or(UNKNOWN_KIND)
}

/// Quality targets must be numbers within `[0.0, 1.0]`.
pub fn check_quality_bounds(document: &Value) -> Vec<String> {
    let Some(metrics) = document.get(QUALITY_FIELD) else {
        return Vec::new();
    };
    if !metrics.is_object() {
        return vec![format!(
            "{} must be an object, got {}",
            QUALITY_FIELD,
            json_type_name(metrics)
        )];
    }

    QUALITY_TARGETS
        .iter()
        .filter_map(|&target| {
            let value = metrics.get(target)?;
            match value.as_f64() {
                Some(n) if (0.0..=1.0).contains(&n) => None,
                _ => Some(format!(
                    "{}.{} must be a number in [0.0, 1.0], got {}",
                    QUALITY_FIELD, target, value
                )),
            }
        })
        .collect()
}

/// The license tag must be the accepted literal.
pub fn check_license(document: &Value) -> Vec<String> {
    match document.get(LICENSE_FIELD) {
        Some(Value::String(tag)) if tag == ACCEPTED_LICENSE => Vec::new(),
        Some(other) => vec![format!(
            "{} must be \"{}\", got {}",
            LICENSE_FIELD, ACCEPTED_LICENSE, other
        )],
        None => vec![format!(
            "{} is missing; expected \"{}\"",
            LICENSE_FIELD, ACCEPTED_LICENSE
        )],
    }
}
