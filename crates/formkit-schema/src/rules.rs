//! Per-field rules derived from field definitions.
//!
//! A `FieldRule` runs in a fixed order and stops at the first failure:
//! presence, shape (type, bounds, email format), `validation.pattern`,
//! custom predicate, cross-field predicate.

use std::fmt;

use formkit_core::{CrossFieldRule, CustomRule, Field, ItemType, Record, SchemaError};
use regex::Regex;
use serde_json::{Number, Value};

use crate::validate::{ValidationError, ValidationErrorKind};

/// `local@domain.tld`, case-insensitive.
pub(crate) const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

/// Absent, `null`, and blank strings count as "no value".
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn type_mismatch(label: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::TypeMismatch,
        format!("{label} must be {expected}, got {}", describe(actual)),
    )
}

fn range(message: String) -> ValidationError {
    ValidationError::new(ValidationErrorKind::RangeViolation, message)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LengthBounds {
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthBounds {
    fn new(field: &str, min: Option<usize>, max: Option<usize>) -> Result<Self, SchemaError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(SchemaError::malformed(
                    field,
                    format!("minLength ({min}) is greater than maxLength ({max})"),
                ));
            }
        }
        Ok(Self { min, max })
    }

    fn check(&self, label: &str, s: &str) -> Result<(), ValidationError> {
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                return Err(range(format!(
                    "{label} must be at least {} long",
                    plural(min, "character")
                )));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(range(format!(
                    "{label} must be at most {} long",
                    plural(max, "character")
                )));
            }
        }
        Ok(())
    }
}

/// Rule for a single scalar value: a non-array field, or one array item.
#[derive(Debug, Clone)]
pub(crate) enum ScalarRule {
    Text(LengthBounds),
    Email {
        multiple: bool,
        length: LengthBounds,
        re: Regex,
    },
    Password(LengthBounds),
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl ScalarRule {
    fn for_item(items_type: ItemType, email: &Regex) -> Self {
        match items_type {
            ItemType::Text => Self::Text(LengthBounds::default()),
            ItemType::Email => Self::Email {
                multiple: false,
                length: LengthBounds::default(),
                re: email.clone(),
            },
            ItemType::Password => Self::Password(LengthBounds::default()),
            ItemType::Number => Self::Number {
                min: None,
                max: None,
            },
        }
    }

    fn number(field: &str, min: Option<f64>, max: Option<f64>) -> Result<Self, SchemaError> {
        for (name, bound) in [("min", min), ("max", max)] {
            if bound.is_some_and(|b| !b.is_finite()) {
                return Err(SchemaError::malformed(
                    field,
                    format!("{name} must be a finite number"),
                ));
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(SchemaError::malformed(
                    field,
                    format!("min ({lo}) is greater than max ({hi})"),
                ));
            }
        }
        Ok(Self::Number { min, max })
    }

    /// Check one value and return its normalized form.
    fn check(&self, label: &str, value: &Value) -> Result<Value, ValidationError> {
        match self {
            Self::Text(length) | Self::Password(length) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_mismatch(label, "text", value))?;
                length.check(label, s)?;
                Ok(value.clone())
            }
            Self::Email {
                multiple,
                length,
                re,
            } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_mismatch(label, "text", value))?;
                length.check(label, s)?;
                let valid = if *multiple {
                    s.split(',').all(|part| re.is_match(part.trim()))
                } else {
                    re.is_match(s.trim())
                };
                if valid {
                    Ok(value.clone())
                } else if *multiple {
                    Err(ValidationError::new(
                        ValidationErrorKind::PatternMismatch,
                        format!("{label} must contain valid email addresses separated by commas"),
                    ))
                } else {
                    Err(ValidationError::new(
                        ValidationErrorKind::PatternMismatch,
                        format!("{label} must be a valid email address"),
                    ))
                }
            }
            Self::Number { min, max } => {
                let (n, normalized) = parse_number(value)
                    .ok_or_else(|| type_mismatch(label, "a number", value))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(range(format!("{label} must be at least {min}")));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(range(format!("{label} must be at most {max}")));
                    }
                }
                Ok(normalized)
            }
        }
    }
}

/// Accept JSON numbers and numeric strings. Non-finite results are not
/// numbers.
fn parse_number(value: &Value) -> Option<(f64, Value)> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| (f, value.clone())),
        Value::String(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Some((i as f64, Value::from(i)));
            }
            let f = t.parse::<f64>().ok().filter(|f| f.is_finite())?;
            Number::from_f64(f).map(|n| (f, Value::Number(n)))
        }
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Shape {
    Scalar(ScalarRule),
    Array {
        item: ScalarRule,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
}

#[derive(Debug, Clone)]
struct PatternRule {
    re: Regex,
    message: Option<String>,
}

impl PatternRule {
    fn check(&self, label: &str, value: &Value) -> Result<(), ValidationError> {
        let strings: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if strings.iter().all(|s| self.re.is_match(s)) {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("{label} does not match the required format"));
        Err(ValidationError::new(
            ValidationErrorKind::PatternMismatch,
            message,
        ))
    }
}

/// The compiled rule of one field.
#[derive(Clone)]
pub(crate) struct FieldRule {
    label: String,
    required: bool,
    shape: Shape,
    pattern: Option<PatternRule>,
    custom: Option<CustomRule>,
    cross_field: Option<CrossFieldRule>,
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("label", &self.label)
            .field("required", &self.required)
            .field("shape", &self.shape)
            .field("pattern", &self.pattern)
            .field("custom", &self.custom.is_some())
            .field("cross_field", &self.cross_field.is_some())
            .finish()
    }
}

impl FieldRule {
    pub(crate) fn compile(name: &str, field: &Field, email: &Regex) -> Result<Self, SchemaError> {
        let common = field.common();
        if common.label.trim().is_empty() {
            return Err(SchemaError::malformed(name, "label must not be empty"));
        }

        let bag = common.validation.as_ref();
        let bag_min = bag.and_then(|v| v.min_length);
        let bag_max = bag.and_then(|v| v.max_length);

        let shape = match field {
            Field::Text(f) => Shape::Scalar(ScalarRule::Text(LengthBounds::new(
                name,
                f.min_length.or(bag_min),
                f.max_length.or(bag_max),
            )?)),
            Field::Email(f) => Shape::Scalar(ScalarRule::Email {
                multiple: f.allow_multiple,
                length: LengthBounds::new(name, bag_min, bag_max)?,
                re: email.clone(),
            }),
            Field::Password(f) => Shape::Scalar(ScalarRule::Password(LengthBounds::new(
                name,
                f.min_length.or(bag_min),
                f.max_length.or(bag_max),
            )?)),
            Field::Number(f) => {
                if f.step.is_some_and(|s| !(s.is_finite() && s > 0.0)) {
                    return Err(SchemaError::malformed(name, "step must be a positive number"));
                }
                Shape::Scalar(ScalarRule::number(name, f.min, f.max)?)
            }
            Field::Array(f) => {
                if let (Some(min), Some(max)) = (f.min_items, f.max_items) {
                    if min > max {
                        return Err(SchemaError::malformed(
                            name,
                            format!("minItems ({min}) is greater than maxItems ({max})"),
                        ));
                    }
                }
                Shape::Array {
                    item: ScalarRule::for_item(f.items_type, email),
                    min_items: f.min_items,
                    max_items: f.max_items,
                }
            }
        };

        let pattern = match bag.and_then(|v| v.pattern.as_deref()) {
            Some(p) => Some(PatternRule {
                re: Regex::new(p)
                    .map_err(|e| SchemaError::malformed(name, format!("invalid pattern: {e}")))?,
                message: bag.and_then(|v| v.message.clone()),
            }),
            None => None,
        };

        Ok(Self {
            label: common.label.clone(),
            required: common.required,
            shape,
            pattern,
            custom: bag.and_then(|v| v.custom.clone()),
            cross_field: bag.and_then(|v| v.cross_field.clone()),
        })
    }

    /// Check the value submitted for this field.
    ///
    /// `Ok(None)` means the field is optional and was left empty; it is
    /// omitted from the normalized record.
    pub(crate) fn check(
        &self,
        value: Option<&Value>,
        record: &Record,
    ) -> Result<Option<Value>, ValidationError> {
        let value = match value {
            Some(v) if !is_empty(v) => v,
            _ if self.required => {
                return Err(ValidationError::new(
                    ValidationErrorKind::RequiredMissing,
                    format!("{} is required", self.label),
                ))
            }
            _ => return Ok(None),
        };

        let normalized = match &self.shape {
            Shape::Scalar(rule) => rule.check(&self.label, value)?,
            Shape::Array {
                item,
                min_items,
                max_items,
            } => self.check_array(item, *min_items, *max_items, value)?,
        };

        if let Some(pattern) = &self.pattern {
            pattern.check(&self.label, &normalized)?;
        }
        if let Some(rule) = &self.custom {
            rule(&normalized)
                .map_err(|m| ValidationError::new(ValidationErrorKind::CustomRule, m))?;
        }
        if let Some(rule) = &self.cross_field {
            rule(&normalized, record)
                .map_err(|m| ValidationError::new(ValidationErrorKind::CustomRule, m))?;
        }

        Ok(Some(normalized))
    }

    fn check_array(
        &self,
        item: &ScalarRule,
        min_items: Option<usize>,
        max_items: Option<usize>,
        value: &Value,
    ) -> Result<Value, ValidationError> {
        let Value::Array(items) = value else {
            return Err(type_mismatch(&self.label, "a list", value));
        };

        // Item count is checked before any item.
        let count = items.len();
        if let Some(min) = min_items {
            if count < min {
                return Err(range(format!(
                    "{} requires at least {}, got {count}",
                    self.label,
                    plural(min, "item")
                )));
            }
        }
        if let Some(max) = max_items {
            if count > max {
                return Err(range(format!(
                    "{} allows at most {}, got {count}",
                    self.label,
                    plural(max, "item")
                )));
            }
        }

        items
            .iter()
            .enumerate()
            .map(|(i, v)| item.check(&format!("{} item {}", self.label, i + 1), v))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email_re() -> Regex {
        Regex::new(EMAIL_PATTERN).unwrap()
    }

    #[test]
    fn email_pattern_accepts_common_addresses() {
        let re = email_re();
        assert!(re.is_match("a@x.com"));
        assert!(re.is_match("First.Last+tag@sub.example.ORG"));
        assert!(!re.is_match("not-an-email"));
        assert!(!re.is_match("a@x"));
        assert!(!re.is_match("a@x.c"));
    }

    #[test]
    fn blank_strings_count_as_empty() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!("   ")));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!([])));
    }

    #[test]
    fn parse_number_normalizes_numeric_strings() {
        assert_eq!(parse_number(&json!("42")), Some((42.0, json!(42))));
        assert_eq!(parse_number(&json!(" 2.5 ")), Some((2.5, json!(2.5))));
        assert_eq!(parse_number(&json!(7)), Some((7.0, json!(7))));
        assert!(parse_number(&json!("NaN")).is_none());
        assert!(parse_number(&json!("inf")).is_none());
        assert!(parse_number(&json!("abc")).is_none());
        assert!(parse_number(&json!(true)).is_none());
    }

    #[test]
    fn length_bounds_count_characters_not_bytes() {
        let bounds = LengthBounds::new("name", Some(2), Some(3)).unwrap();
        assert!(bounds.check("Name", "éé").is_ok());
        assert!(bounds.check("Name", "ééé").is_ok());
        let err = bounds.check("Name", "é").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RangeViolation);
        assert_eq!(err.message, "Name must be at least 2 characters long");
    }

    #[test]
    fn inverted_length_bounds_are_malformed() {
        assert!(LengthBounds::new("name", Some(5), Some(1)).is_err());
    }

    #[test]
    fn number_rule_rejects_non_finite_bounds() {
        assert!(ScalarRule::number("n", Some(f64::NAN), None).is_err());
        assert!(ScalarRule::number("n", None, Some(f64::INFINITY)).is_err());
        assert!(ScalarRule::number("n", Some(1.0), Some(1.0)).is_ok());
    }

    #[test]
    fn item_rule_for_email_is_single_address() {
        let rule = ScalarRule::for_item(ItemType::Email, &email_re());
        assert!(rule.check("Emails item 1", &json!("a@x.com")).is_ok());
        let err = rule
            .check("Emails item 1", &json!("a@x.com, b@y.com"))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::PatternMismatch);
    }
}
