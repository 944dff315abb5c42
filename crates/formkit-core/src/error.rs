//! # Error Types
//!
//! Schema errors are construction-time failures: a schema that cannot be
//! parsed, or a field definition that is unrecognized or incomplete, is
//! rejected before any validator exists. Per-field validation failures of a
//! submitted record are not errors in this sense and live in
//! `formkit-schema`.

use thiserror::Error;

/// Failure to build or load a form schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A single field definition is unrecognized, incomplete, or inconsistent.
    #[error("malformed field '{field}': {reason}")]
    Malformed {
        /// Name of the offending field.
        field: String,
        /// What is wrong with the definition.
        reason: String,
    },

    /// The schema document itself has the wrong shape (e.g. no `fields`).
    #[error("malformed schema: {0}")]
    InvalidStructure(String),

    /// The schema text is not valid JSON or YAML.
    #[error("parse error: {0}")]
    Parse(String),

    /// IO error reading a schema or record file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::Malformed`].
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the schema's content rather than by IO or
    /// text syntax.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::InvalidStructure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_names_field() {
        let err = SchemaError::malformed("tags", "missing field `itemsType`");
        assert_eq!(
            err.to_string(),
            "malformed field 'tags': missing field `itemsType`"
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn parse_error_is_not_malformed() {
        let err = SchemaError::Parse("expected value at line 1 column 1".into());
        assert!(!err.is_malformed());
    }
}
