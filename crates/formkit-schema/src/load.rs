//! # Schema and Record Loading
//!
//! Schemas are authored as JSON or YAML. Both are turned into a
//! `serde_json::Value` first and then parsed by
//! [`FormSchema::from_value`], so field-level errors read the same whatever
//! the source format.

use std::path::Path;

use formkit_core::{FormSchema, Record, SchemaError};
use serde_json::Value;
use serde_yaml::Value as Yaml;

/// Parse a schema from JSON text.
///
/// # Errors
///
/// `SchemaError::Parse` for invalid JSON, otherwise whatever
/// [`FormSchema::from_value`] reports.
pub fn parse_json(text: &str) -> Result<FormSchema, SchemaError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SchemaError::Parse(format!("invalid JSON: {e}")))?;
    FormSchema::from_value(value)
}

/// Parse a schema from YAML text.
///
/// # Errors
///
/// `SchemaError::Parse` for invalid YAML or YAML that has no JSON
/// equivalent, otherwise whatever [`FormSchema::from_value`] reports.
pub fn parse_yaml(text: &str) -> Result<FormSchema, SchemaError> {
    FormSchema::from_value(yaml_text_to_json(text)?)
}

/// Load a schema file. `.yaml` / `.yml` are read as YAML, everything else
/// as JSON.
///
/// # Errors
///
/// `SchemaError::Io` if the file cannot be read, then as for
/// [`parse_json`] / [`parse_yaml`].
pub fn load_file(path: &Path) -> Result<FormSchema, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    let schema = if is_yaml(path) {
        parse_yaml(&content)?
    } else {
        parse_json(&content)?
    };
    tracing::debug!(path = %path.display(), fields = schema.len(), "loaded form schema");
    Ok(schema)
}

/// Parse a submitted record from JSON text. The document must be an object.
///
/// # Errors
///
/// `SchemaError::Parse` for invalid JSON or a non-object document.
pub fn parse_record_json(text: &str) -> Result<Record, SchemaError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SchemaError::Parse(format!("invalid JSON: {e}")))?;
    into_record(value)
}

/// Load a record file, JSON or YAML by extension.
///
/// # Errors
///
/// `SchemaError::Io` if the file cannot be read, `SchemaError::Parse` if it
/// is not an object in the expected format.
pub fn load_record_file(path: &Path) -> Result<Record, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    if is_yaml(path) {
        into_record(yaml_text_to_json(&content)?)
    } else {
        parse_record_json(&content)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn into_record(value: Value) -> Result<Record, SchemaError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::Parse(format!(
            "record must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn yaml_text_to_json(text: &str) -> Result<Value, SchemaError> {
    let yaml: Yaml =
        serde_yaml::from_str(text).map_err(|e| SchemaError::Parse(format!("invalid YAML: {e}")))?;
    yaml_into_json(yaml)
}

/// Move a YAML document into JSON. Mapping order is kept and tags are
/// dropped.
fn yaml_into_json(yaml: Yaml) -> Result<Value, SchemaError> {
    let json = match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_into_json).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| Ok((yaml_key(key)?, yaml_into_json(value)?)))
                .collect::<Result<Record, SchemaError>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_into_json(tagged.value)?,
    };
    Ok(json)
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Value, SchemaError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| SchemaError::Parse(format!("YAML number {n} has no JSON equivalent")))
}

/// Object keys are strings in JSON; scalar YAML keys are written out.
fn yaml_key(key: Yaml) -> Result<String, SchemaError> {
    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(SchemaError::Parse(format!(
            "YAML mapping keys must be scalars, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::FieldType;
    use serde_json::json;

    const SIGNUP_YAML: &str = r#"
title: Signup
fields:
  username:
    type: text
    label: Username
    required: true
    minLength: 3
  age:
    type: number
    label: Age
    min: 18
    max: 120
  tags:
    type: array
    label: Tags
    itemsType: text
    maxItems: 3
"#;

    #[test]
    fn yaml_schema_keeps_field_order() {
        let schema = parse_yaml(SIGNUP_YAML).unwrap();
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["username", "age", "tags"]);
        assert_eq!(schema.get("tags").unwrap().field_type(), FieldType::Array);
    }

    #[test]
    fn json_and_yaml_parse_to_the_same_schema() {
        let from_yaml = parse_yaml(SIGNUP_YAML).unwrap();
        let json_text = serde_json::to_string(&from_yaml).unwrap();
        let from_json = parse_json(&json_text).unwrap();
        assert_eq!(
            serde_json::to_value(&from_yaml).unwrap(),
            serde_json::to_value(&from_json).unwrap()
        );
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_json("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
        assert!(!err.is_malformed());
    }

    #[test]
    fn unknown_type_in_yaml_is_malformed() {
        let err = parse_yaml("fields:\n  when:\n    type: date\n    label: When\n").unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { ref field, .. } if field == "when"));
    }

    #[test]
    fn record_must_be_an_object() {
        let err = parse_record_json("[1, 2]").unwrap_err();
        assert_eq!(err.to_string(), "parse error: record must be an object, got an array");
        let record = parse_record_json(r#"{ "age": 18 }"#).unwrap();
        assert_eq!(record.get("age"), Some(&json!(18)));
    }

    #[test]
    fn load_file_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("signup.yaml");
        std::fs::write(&yaml_path, SIGNUP_YAML).unwrap();
        let json_path = dir.path().join("signup.json");
        std::fs::write(
            &json_path,
            r#"{ "fields": { "email": { "type": "email", "label": "Email" } } }"#,
        )
        .unwrap();

        assert_eq!(load_file(&yaml_path).unwrap().len(), 3);
        assert_eq!(load_file(&json_path).unwrap().len(), 1);
    }

    #[test]
    fn load_file_reports_missing_file_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }

    #[test]
    fn load_record_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.yml");
        std::fs::write(&path, "age: 18\ntags: [a, b]\n").unwrap();
        let record = load_record_file(&path).unwrap();
        assert_eq!(record.get("tags"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn yaml_tags_and_scalar_keys_convert() {
        let yaml: Yaml = serde_yaml::from_str("1: !custom one\ntrue: 2.5\n").unwrap();
        let value = yaml_into_json(yaml).unwrap();
        assert_eq!(value, json!({ "1": "one", "true": 2.5 }));
    }

    #[test]
    fn yaml_without_json_equivalent_is_a_parse_error() {
        let err = parse_yaml("fields:\n  ratio:\n    type: number\n    label: R\n    max: .nan\n")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(ref m) if m.contains("no JSON equivalent")));

        let err = yaml_text_to_json("? [a, b]\n: 1\n").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(ref m) if m.contains("must be scalars")));
    }
}
