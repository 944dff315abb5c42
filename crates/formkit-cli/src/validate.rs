//! # Validate Subcommand
//!
//! Feeds a record file through a [`FormSession`]: the record replaces the
//! session's values as-is, with no default pre-fill, then the form is
//! submitted to a handler that accepts the normalized data. Keys the schema
//! does not declare are ignored, as they are by the validator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use formkit_core::Record;
use formkit_form::{FormSession, SubmitOutcome};

use crate::config::OutputFormat;

/// Arguments for the `formkit validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (`.json`, `.yaml`, or `.yml`).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Record file: a JSON or YAML object of field values.
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the record is accepted, 1 if it is rejected,
/// 2 for a malformed schema.
pub async fn run_validate(args: &ValidateArgs, format: OutputFormat) -> Result<u8> {
    let Some(schema) = crate::load_schema(&args.schema)? else {
        return Ok(crate::EXIT_MALFORMED);
    };
    let session = match FormSession::new(schema) {
        Ok(session) => session,
        Err(e) => {
            println!("FAIL: {}: {e}", args.schema.display());
            return Ok(crate::EXIT_MALFORMED);
        }
    };

    let record = formkit_schema::load_record_file(&args.record)
        .with_context(|| format!("failed to load record {}", args.record.display()))?;

    let ignored = record
        .keys()
        .filter(|name| !session.validator().contains(name))
        .count();
    if ignored > 0 {
        tracing::debug!(ignored, "record keys not declared by the schema");
    }
    session.replace_values(record);

    let accept = |_: &Record| -> Result<()> { Ok(()) };
    let outcome = session.submit(&accept).await;
    report(&outcome, format)
}

fn report(outcome: &SubmitOutcome, format: OutputFormat) -> Result<u8> {
    match (outcome, format) {
        (SubmitOutcome::Submitted(data), OutputFormat::Json) => {
            let body = serde_json::json!({ "valid": true, "data": data });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(0)
        }
        (SubmitOutcome::Submitted(data), OutputFormat::Text) => {
            println!("OK: record accepted");
            for (name, value) in data {
                println!("  {name} = {value}");
            }
            Ok(0)
        }
        (SubmitOutcome::Invalid(errors), OutputFormat::Json) => {
            let body = serde_json::json!({ "valid": false, "errors": errors });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(1)
        }
        (SubmitOutcome::Invalid(errors), OutputFormat::Text) => {
            println!("FAIL: {} field(s) rejected", errors.len());
            print!("{errors}");
            Ok(1)
        }
        (other, _) => anyhow::bail!("unexpected submission outcome: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCHEMA: &str = r#"{
        "fields": {
            "name": { "type": "text", "label": "Name", "required": true },
            "age": { "type": "number", "label": "Age", "min": 18, "max": 120 }
        }
    }"#;

    fn file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    fn args(schema: &tempfile::NamedTempFile, record: &tempfile::NamedTempFile) -> ValidateArgs {
        ValidateArgs {
            schema: schema.path().to_path_buf(),
            record: record.path().to_path_buf(),
            format: None,
        }
    }

    #[tokio::test]
    async fn accepted_record_exits_zero() {
        let schema = file(".json", SCHEMA);
        let record = file(".json", r#"{ "name": "Ada", "age": "36", "extra": true }"#);
        let code = run_validate(&args(&schema, &record), OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn rejected_record_exits_one() {
        let schema = file(".json", SCHEMA);
        let record = file(".yaml", "age: 17\n");
        let code = run_validate(&args(&schema, &record), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn defaults_are_not_injected_into_the_record() {
        let schema = file(
            ".json",
            r#"{
                "fields": {
                    "age": {
                        "type": "number", "label": "Age", "required": true,
                        "min": 18, "max": 120, "default": 30
                    }
                }
            }"#,
        );
        let empty = file(".json", "{}");
        let code = run_validate(&args(&schema, &empty), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, 1);

        let given = file(".json", r#"{ "age": 30 }"#);
        let code = run_validate(&args(&schema, &given), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn malformed_schema_exits_two() {
        let schema = file(
            ".json",
            r#"{ "fields": { "tags": { "type": "array", "label": "Tags" } } }"#,
        );
        let record = file(".json", "{}");
        let code = run_validate(&args(&schema, &record), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn non_object_record_is_an_error() {
        let schema = file(".json", SCHEMA);
        let record = file(".json", "[1, 2]");
        assert!(run_validate(&args(&schema, &record), OutputFormat::Text)
            .await
            .is_err());
    }
}
