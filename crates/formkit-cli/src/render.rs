//! # Render Subcommand
//!
//! Prints the form view a host UI would draw: one widget per field in
//! display order, plus the reset and submit button states. With
//! `--values`, the values are applied as user changes first so that
//! per-field errors and array affordances show up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use formkit_form::{FormSession, FormView, Widget};

use crate::config::OutputFormat;

/// Arguments for the `formkit render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Schema file (`.json`, `.yaml`, or `.yml`).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Record file whose values are entered before rendering.
    #[arg(long, value_name = "RECORD")]
    pub values: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the render subcommand.
///
/// Returns exit code: 0 on success, 2 for a malformed schema.
pub fn run_render(args: &RenderArgs, format: OutputFormat) -> Result<u8> {
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

    if let Some(path) = &args.values {
        let record = formkit_schema::load_record_file(path)
            .with_context(|| format!("failed to load values {}", path.display()))?;
        for (name, value) in record {
            if session.validator().contains(&name) {
                session.change(&name, value)?;
            }
        }
    }

    let view = session.view();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print!("{}", render_text(&view)),
    }
    Ok(0)
}

/// Plain-text outline of a form view.
pub fn render_text(view: &FormView) -> String {
    let mut out = String::new();
    if let Some(title) = &view.title {
        out.push_str(&format!("# {title}\n"));
    }
    if let Some(description) = &view.description {
        out.push_str(&format!("{description}\n"));
    }
    for widget in &view.fields {
        let frame = widget.frame();
        let marker = if frame.required { " *" } else { "" };
        out.push_str(&format!(
            "[{}] {}{marker}: {}\n",
            kind(widget),
            frame.label,
            detail(widget)
        ));
        if let Some(error) = &frame.error {
            out.push_str(&format!("    ! {error}\n"));
        }
    }
    let button = |b: &formkit_form::ButtonState| {
        if b.enabled {
            format!("<{}>", b.label)
        } else {
            format!("({})", b.label)
        }
    };
    out.push_str(&format!("{} {}\n", button(&view.reset), button(&view.submit)));
    out
}

fn kind(widget: &Widget) -> &'static str {
    match widget {
        Widget::Text(_) => "text",
        Widget::Email(_) => "email",
        Widget::Password(_) => "password",
        Widget::Number(_) => "number",
        Widget::Array(_) => "array",
    }
}

fn detail(widget: &Widget) -> String {
    match widget {
        Widget::Text(w) => w
            .input
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default(),
        Widget::Email(w) => w.hint.clone().unwrap_or_default(),
        Widget::Password(w) => match w.strength {
            Some(s) => format!("strength {}/5 ({})", s.score, s.label),
            None => String::new(),
        },
        Widget::Number(w) => match &w.unit {
            Some(unit) => format!("step {} {unit}", w.step),
            None => format!("step {}", w.step),
        },
        Widget::Array(w) => format!("{} item(s) {}", w.items.len(), w.hints.join("; ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::{Field, FormSchema};
    use std::io::Write;

    #[test]
    fn text_outline_lists_fields_and_buttons() {
        let schema = FormSchema::new()
            .with_title("Contact")
            .with_field("name", Field::text("Name").required())
            .unwrap()
            .with_field("email", Field::email("Email"))
            .unwrap()
            .with_field(
                "secret",
                formkit_core::PasswordField::new("Secret").strength_indicator(),
            )
            .unwrap();
        let session = FormSession::new(schema).unwrap();
        session.change("email", "nope").unwrap();
        session.change("secret", "abcdefgh").unwrap();

        let text = render_text(&session.view());
        assert!(text.starts_with("# Contact\n"));
        assert!(text.contains("[text] Name *"));
        assert!(text.contains("[email] Email"));
        assert!(text.contains("    ! "));
        assert!(text.contains("[password] Secret: strength 2/5 (Fair)"));
        assert!(text.ends_with("<Reset> (Submit)\n"));
    }

    #[test]
    fn render_with_values_exits_zero() {
        let mut schema = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let yaml = concat!(
            "fields:\n",
            "  tags:\n",
            "    type: array\n",
            "    label: Tags\n",
            "    itemsType: text\n",
            "    maxItems: 2\n",
        );
        schema.write_all(yaml.as_bytes()).unwrap();
        let mut values = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        values.write_all(br#"{ "tags": ["a", "b"] }"#).unwrap();

        let args = RenderArgs {
            schema: schema.path().to_path_buf(),
            values: Some(values.path().to_path_buf()),
            format: None,
        };
        assert_eq!(run_render(&args, OutputFormat::Json).unwrap(), 0);
        assert_eq!(run_render(&args, OutputFormat::Text).unwrap(), 0);
    }
}
