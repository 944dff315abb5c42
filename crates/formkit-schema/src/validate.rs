//! # Record Validation
//!
//! [`compile`] maps a [`FormSchema`] to a [`FormValidator`], one rule per
//! field. [`FormValidator::validate`] checks a submitted record against all
//! of them and returns either the normalized record or one
//! [`ValidationError`] per failing field.
//!
//! ## Rules per field type
//!
//! | Type | Accepts | Bounds |
//! |------|---------|--------|
//! | text | string | `minLength` / `maxLength` |
//! | email | `local@domain.tld`, or a comma list with `allowMultiple` | length from `validation` |
//! | password | string | `minLength` / `maxLength` |
//! | number | JSON number or numeric string | `min` / `max`, inclusive |
//! | array | list of `itemsType` values | `minItems` / `maxItems`, checked before items |
//!
//! An optional field left empty (absent, `null`, blank string) passes and
//! runs no other rule. A required one fails with `RequiredMissing`.
//!
//! ## Normalization
//!
//! The validated record only carries schema fields. Extra keys are dropped,
//! empty optional fields are omitted, and numeric strings become numbers.
//! Field defaults are never injected.

use std::collections::BTreeMap;
use std::fmt;

use formkit_core::{FormSchema, Record, SchemaError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rules::{FieldRule, EMAIL_PATTERN};

/// Why a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// A required field was absent or empty.
    RequiredMissing,
    /// The value has the wrong JSON type, or is not numeric.
    TypeMismatch,
    /// A number, length, or item count fell outside its bounds.
    RangeViolation,
    /// An email address or `validation.pattern` did not match.
    PatternMismatch,
    /// A custom or cross-field predicate rejected the value.
    CustomRule,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredMissing => "RequiredMissing",
            Self::TypeMismatch => "TypeMismatch",
            Self::RangeViolation => "RangeViolation",
            Self::PatternMismatch => "PatternMismatch",
            Self::CustomRule => "CustomRule",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failure of one field. Serializes as `{ "type": ..., "message": ... }`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    /// Human-readable message, suitable for display under the input.
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Field name → error, one entry per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, error: ValidationError) {
        self.errors.insert(field.into(), error);
    }

    /// Drop the error of `field`, if any.
    pub fn remove(&mut self, field: &str) -> Option<ValidationError> {
        self.errors.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.errors.get(field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> BTreeMap<String, ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {field}: {} ({})", error.message, error.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl FromIterator<(String, ValidationError)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (String, ValidationError)>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Pure validator derived from a [`FormSchema`].
///
/// Holds no mutable state: it can be shared freely and re-used across
/// submissions. Rebuild it whenever the schema changes; compilation is
/// cheap.
#[derive(Debug, Clone)]
pub struct FormValidator {
    rules: Vec<(String, FieldRule)>,
}

/// Build a validator for `schema`.
///
/// # Errors
///
/// Returns `SchemaError::Malformed` naming the first field whose definition
/// is inconsistent: empty label, `min > max`, `minLength > maxLength`,
/// `minItems > maxItems`, non-finite bound, non-positive `step`, or an
/// invalid `validation.pattern`.
pub fn compile(schema: &FormSchema) -> Result<FormValidator, SchemaError> {
    let email = Regex::new(EMAIL_PATTERN)
        .map_err(|e| SchemaError::InvalidStructure(format!("email pattern: {e}")))?;

    let rules = schema
        .fields()
        .map(|(name, field)| {
            FieldRule::compile(name, field, &email).map(|rule| (name.to_string(), rule))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(fields = rules.len(), "compiled form validator");
    Ok(FormValidator { rules })
}

impl FormValidator {
    /// Validate a submitted record.
    ///
    /// Every field is checked; failures do not stop the pass. Keys not in
    /// the schema are ignored.
    ///
    /// # Errors
    ///
    /// Returns the mapping of failing fields when it is non-empty.
    pub fn validate(&self, record: &Record) -> Result<Record, ValidationErrors> {
        let mut normalized = Record::new();
        let mut errors = ValidationErrors::new();

        for (name, rule) in &self.rules {
            match rule.check(record.get(name), record) {
                Ok(Some(value)) => {
                    normalized.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::trace!(field = %name, kind = %error.kind, "field failed validation");
                    errors.insert(name.clone(), error);
                }
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            tracing::debug!(failed = errors.len(), "record failed validation");
            Err(errors)
        }
    }

    /// Check a single field of `record`, as done on every change.
    ///
    /// Returns the normalized value, `None` for an empty optional field or a
    /// name the schema does not know.
    ///
    /// # Errors
    ///
    /// Returns the field's first failing rule.
    pub fn validate_field(
        &self,
        name: &str,
        record: &Record,
    ) -> Result<Option<Value>, ValidationError> {
        match self.rules.iter().find(|(n, _)| n == name) {
            Some((_, rule)) => rule.check(record.get(name), record),
            None => Ok(None),
        }
    }

    /// True if the schema has a field called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|(n, _)| n == name)
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
