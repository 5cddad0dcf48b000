//! Structural validation of catalog documents against the compiled schema.

use serde_json::{Map, Value};

use crate::error::{ConfigError, ErrorRecord};
use crate::types::ValidateOptions;

/// Anything that can report the constraint violations of a document.
///
/// The batch runner only depends on this seam, so the engine behind it can
/// change without touching collection, loading or reporting.
pub trait DocumentValidator {
    /// Every violation found in `document`, in deterministic order.
    fn errors(&self, document: &Value) -> Vec<ErrorRecord>;
}

/// A schema compiled once per run and shared by every document.
pub struct CatalogSchema {
    schema: Value,
    validator: jsonschema::Validator,
    format_check: bool,
}

impl std::fmt::Debug for CatalogSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSchema")
            .field("format_check", &self.format_check)
            .finish_non_exhaustive()
    }
}

impl CatalogSchema {
    /// Compile a draft 2020-12 schema.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSchema` when the schema does not conform
    /// to the meta-schema or cannot be compiled.
    pub fn compile(schema: &Value, options: &ValidateOptions) -> Result<Self, ConfigError> {
        let validator = build_validator(schema, options.format_check).map_err(|e| {
            ConfigError::InvalidSchema {
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            schema: schema.clone(),
            validator,
            format_check: options.format_check,
        })
    }

    /// Errors of each alternative of a failed `oneOf`/`anyOf`.
    fn alternative_errors(
        &self,
        document: &Value,
        schema_pointer: &str,
        instance_pointer: &str,
        parent: &[PathToken],
    ) -> Vec<ErrorRecord> {
        let tokens = pointer_tokens(schema_pointer);
        if !matches!(tokens.last().map(String::as_str), Some("oneOf" | "anyOf")) {
            return Vec::new();
        }
        let Some(Value::Array(alternatives)) = navigate_schema(&self.schema, &tokens) else {
            return Vec::new();
        };
        let Some(instance) = document.pointer(instance_pointer) else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for alternative in alternatives {
            let standalone = with_root_definitions(alternative, &self.schema);
            let Ok(validator) = build_validator(&standalone, self.format_check) else {
                continue;
            };
            records.extend(collect_sorted(&validator, instance, parent, |_, _, _| {
                Vec::new()
            }));
        }
        records
    }
}

impl DocumentValidator for CatalogSchema {
    fn errors(&self, document: &Value) -> Vec<ErrorRecord> {
        collect_sorted(
            &self.validator,
            document,
            &[],
            |instance_pointer, schema_pointer, location| {
                self.alternative_errors(document, schema_pointer, instance_pointer, location)
            },
        )
    }
}

fn build_validator(
    schema: &Value,
    format_check: bool,
) -> Result<jsonschema::Validator, jsonschema::ValidationError<'static>> {
    jsonschema::draft202012::options()
        .should_validate_formats(format_check)
        .build(schema)
}

/// Run `validator` over `instance` and return records sorted by location.
///
/// `parent` is the location of `instance` inside the full document.
/// `subcontext` receives the instance pointer, schema pointer and resolved
/// location of each error.
fn collect_sorted<F>(
    validator: &jsonschema::Validator,
    instance: &Value,
    parent: &[PathToken],
    subcontext: F,
) -> Vec<ErrorRecord>
where
    F: Fn(&str, &str, &[PathToken]) -> Vec<ErrorRecord>,
{
    let mut located: Vec<(Vec<PathToken>, ErrorRecord)> = validator
        .iter_errors(instance)
        .map(|e| {
            let instance_pointer = e.instance_path.to_string();
            let schema_pointer = e.schema_path.to_string();
            let mut location = parent.to_vec();
            location.extend(locate(instance, &instance_pointer));
            let record = ErrorRecord {
                path: render_location(&location),
                message: e.to_string(),
                subcontext: subcontext(&instance_pointer, &schema_pointer, &location),
            };
            (location, record)
        })
        .collect();

    located.sort_by(|a, b| a.0.cmp(&b.0));
    located.into_iter().map(|(_, record)| record).collect()
}

/// One step from the document root to a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PathToken {
    Key(String),
    Index(usize),
}

/// Split an RFC 6901 pointer into unescaped reference tokens.
fn pointer_tokens(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .strip_prefix('/')
        .unwrap_or(pointer)
        .split('/')
        .map(|part| part.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Resolve a pointer against the document so array positions and numeric
/// object keys are told apart.
fn locate(document: &Value, pointer: &str) -> Vec<PathToken> {
    let mut current = Some(document);
    pointer_tokens(pointer)
        .into_iter()
        .map(|token| {
            let (step, next) = match (current, token.parse::<usize>()) {
                (Some(Value::Array(items)), Ok(index)) => {
                    (PathToken::Index(index), items.get(index))
                }
                (Some(Value::Object(map)), _) => {
                    let next = map.get(&token);
                    (PathToken::Key(token), next)
                }
                _ => (PathToken::Key(token), None),
            };
            current = next;
            step
        })
        .collect()
}

fn render_location(tokens: &[PathToken]) -> String {
    let mut out = String::from("$");
    for token in tokens {
        match token {
            PathToken::Key(key) => {
                out.push('.');
                out.push_str(key);
            }
            PathToken::Index(index) => {
                out.push_str(&format!("[{}]", index));
            }
        }
    }
    out
}

/// Walk schema keyword tokens, following local `$ref`s.
///
/// A `$ref` is followed either when the pointer names it explicitly or when
/// the next keyword only exists on the referenced schema.
fn navigate_schema<'a>(root: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for token in tokens {
        current = match (token.as_str(), current) {
            ("$ref", Value::Object(_)) => follow_ref(root, current)?,
            (_, Value::Object(map)) => match map.get(token) {
                Some(next) => next,
                None => follow_ref(root, current)?.get(token)?,
            },
            (_, Value::Array(items)) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn follow_ref<'a>(root: &'a Value, schema: &Value) -> Option<&'a Value> {
    let reference = schema.get("$ref")?.as_str()?;
    root.pointer(reference.strip_prefix('#')?)
}

/// Copy the root's definition tables into a subschema so its local `$ref`s
/// still resolve when it is compiled on its own.
fn with_root_definitions(subschema: &Value, root: &Value) -> Value {
    let Value::Object(map) = subschema else {
        return subschema.clone();
    };
    let mut standalone: Map<String, Value> = map.clone();
    for key in ["$defs", "definitions"] {
        if let Some(defs) = root.get(key) {
            standalone
                .entry(key.to_string())
                .or_insert_with(|| defs.clone());
        }
    }
    Value::Object(standalone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(schema: Value) -> CatalogSchema {
        CatalogSchema::compile(&schema, &ValidateOptions::default()).unwrap()
    }

    #[test]
    fn valid_document_has_no_errors() {
        let schema = compile(json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        }));
        assert!(schema.errors(&json!({ "id": "ipf-001" })).is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let schema = compile(json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "version": { "type": "integer" }
            },
            "required": ["id", "name", "version"]
        }));
        let errors = schema.errors(&json!({ "name": 5, "version": "one" }));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn errors_sorted_by_location() {
        let schema = compile(json!({
            "type": "object",
            "properties": {
                "b": { "type": "string" },
                "a": { "type": "array", "items": { "type": "integer" } }
            }
        }));
        let errors = schema.errors(&json!({ "b": 1, "a": [1, "x", 3, "y"] }));
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["$.a[1]", "$.a[3]", "$.b"]);
    }

    #[test]
    fn numeric_object_keys_render_as_members() {
        let schema = compile(json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }));
        let errors = schema.errors(&json!({ "0": 1 }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.0");
    }

    #[test]
    fn root_errors_use_root_marker() {
        let schema = compile(json!({ "type": "object" }));
        let errors = schema.errors(&json!([1, 2]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$");
    }

    #[test]
    fn one_of_failure_carries_subcontext() {
        let schema = compile(json!({
            "type": "object",
            "properties": {
                "contact": {
                    "oneOf": [
                        { "type": "string" },
                        {
                            "type": "object",
                            "required": ["email"]
                        }
                    ]
                }
            }
        }));
        let errors = schema.errors(&json!({ "contact": { "phone": "555" } }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.contact");
        assert_eq!(errors[0].subcontext.len(), 2);
        assert!(errors[0]
            .subcontext
            .iter()
            .all(|sub| sub.path == "$.contact"));
    }

    #[test]
    fn any_of_subcontext_follows_local_refs() {
        let schema = compile(json!({
            "$defs": {
                "hatch": {
                    "anyOf": [
                        { "$ref": "#/$defs/named" },
                        { "type": "string" }
                    ]
                },
                "named": { "type": "object", "required": ["kind"] }
            },
            "type": "object",
            "properties": {
                "escape_hatches": { "type": "array", "items": { "$ref": "#/$defs/hatch" } }
            }
        }));
        let errors = schema.errors(&json!({ "escape_hatches": [{ "kind": "A" }, { "note": 1 }] }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.escape_hatches[1]");
        assert!(!errors[0].subcontext.is_empty());
    }

    #[test]
    fn malformed_schema_is_config_error() {
        let err = CatalogSchema::compile(&json!({ "type": 12 }), &ValidateOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSchema { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn format_check_is_optional() {
        let schema = json!({
            "type": "object",
            "properties": { "released": { "type": "string", "format": "date" } }
        });
        let doc = json!({ "released": "not-a-date" });

        let checked = CatalogSchema::compile(&schema, &ValidateOptions::new()).unwrap();
        assert_eq!(checked.errors(&doc).len(), 1);

        let unchecked =
            CatalogSchema::compile(&schema, &ValidateOptions::new().format_check(false)).unwrap();
        assert!(unchecked.errors(&doc).is_empty());
    }

    #[test]
    fn pointer_tokens_unescape() {
        assert!(pointer_tokens("").is_empty());
        assert_eq!(pointer_tokens("/a~1b/c~0d"), vec!["a/b", "c~d"]);
    }

    #[test]
    fn navigate_schema_follows_ref() {
        let root = json!({
            "$defs": { "x": { "oneOf": [] } },
            "properties": { "p": { "$ref": "#/$defs/x" } }
        });
        let tokens = pointer_tokens("/properties/p/$ref/oneOf");
        assert_eq!(navigate_schema(&root, &tokens), Some(&json!([])));
    }
}
