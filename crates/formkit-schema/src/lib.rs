//! # formkit-schema: Validator Compiler & Schema Loading
//!
//! Turns a [`FormSchema`](formkit_core::FormSchema) into a
//! [`FormValidator`] and loads schemas from JSON or YAML.
//!
//! ## Compilation (`validate`)
//!
//! [`compile`] derives one independent rule per field. It refuses to build
//! a validator for a field whose definition is inconsistent (`min > max`,
//! `minItems > maxItems`, an invalid `validation.pattern`, ...). Unknown type
//! tags and arrays without `itemsType` never get this far: they fail while
//! the schema is parsed.
//!
//! ## Validation
//!
//! - [`FormValidator::validate`] checks every field and collects one
//!   [`ValidationError`] per failing field. A record is valid iff the
//!   mapping is empty.
//! - The validator is pure. Validating the same record twice yields the
//!   same result.
//!
//! ## Loading (`load`)
//!
//! [`load::load_file`] picks JSON or YAML from the file extension. YAML is
//! converted into JSON values before parsing so both formats share one
//! code path.
//!
//! ## Crate Policy
//!
//! - Depends only on `formkit-core` internally.
//! - Per-field failures never escape as `Err` from the compiler. They are
//!   data in `ValidationErrors`.

pub mod load;
mod rules;
pub mod validate;

pub use load::{load_file, load_record_file, parse_json, parse_record_json, parse_yaml};
pub use validate::{
    compile, FormValidator, ValidationError, ValidationErrorKind, ValidationErrors,
};
