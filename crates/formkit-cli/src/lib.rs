//! # formkit-cli: Command-Line Front End
//!
//! Provides the `formkit` binary for working with form schemas outside a
//! host application.
//!
//! ## Subcommands
//!
//! - `formkit check <schema>`: parse and compile a schema, report its fields.
//! - `formkit validate <schema> <record>`: run a record through the
//!   submission lifecycle and print the normalized data or the errors.
//! - `formkit render <schema> [--values <record>]`: print the form view.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | record rejected, or an operational error |
//! | 2 | malformed schema |

pub mod check;
pub mod config;
pub mod render;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use formkit_core::{FormSchema, SchemaError};

/// Exit code for a schema that cannot be parsed or compiled.
pub const EXIT_MALFORMED: u8 = 2;

/// Load a schema file, printing the reason when it is unusable.
///
/// `Ok(None)` means the schema was reported as malformed and the caller
/// should exit with [`EXIT_MALFORMED`]. Read failures are returned as
/// errors.
pub fn load_schema(path: &Path) -> Result<Option<FormSchema>> {
    match formkit_schema::load_file(path) {
        Ok(schema) => Ok(Some(schema)),
        Err(SchemaError::Io(e)) => {
            Err(anyhow::Error::new(e).context(format!("failed to read {}", path.display())))
        }
        Err(e) => {
            println!("FAIL: {}: {e}", path.display());
            Ok(None)
        }
    }
}
