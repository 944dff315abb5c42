//! # Check Subcommand
//!
//! Parses a schema file and compiles its validator without touching any
//! record. Catches every construction failure a host application would hit
//! at startup.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::config::OutputFormat;

/// Arguments for the `formkit check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema file (`.json`, `.yaml`, or `.yml`).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Serialize)]
struct FieldSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    field_type: &'static str,
    label: &'a str,
    required: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 for a usable schema, 2 for a malformed one.
pub fn run_check(args: &CheckArgs, format: OutputFormat) -> Result<u8> {
    let Some(schema) = crate::load_schema(&args.schema)? else {
        return Ok(crate::EXIT_MALFORMED);
    };
    if let Err(e) = formkit_schema::compile(&schema) {
        println!("FAIL: {}: {e}", args.schema.display());
        return Ok(crate::EXIT_MALFORMED);
    }

    tracing::info!(fields = schema.len(), "schema compiled");

    let fields: Vec<FieldSummary<'_>> = schema
        .fields()
        .map(|(name, field)| FieldSummary {
            name,
            field_type: field.field_type().as_str(),
            label: field.label(),
            required: field.is_required(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "ok": true,
                "title": schema.title,
                "fields": fields,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("OK: {} ({} fields)", args.schema.display(), fields.len());
            for f in &fields {
                let marker = if f.required { " *" } else { "" };
                println!("  {:<16} {:<8} {}{marker}", f.name, f.field_type, f.label);
            }
        }
    }
    Ok(0)
}
