//! # Field Model
//!
//! Defines the closed `Field` union and its five variants. On the wire a
//! field is a JSON object tagged by `type`, with camelCase attribute names:
//!
//! ```json
//! { "type": "number", "label": "Age", "required": true, "min": 18, "max": 120 }
//! { "type": "array", "label": "Tags", "itemsType": "text", "maxItems": 3 }
//! ```
//!
//! Attributes that do not belong to the active tag are ignored. An unknown
//! `type`, a missing `label`, or an array without `itemsType` fails to
//! deserialize.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Record;

/// The five field kinds a schema may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Array,
}

impl FieldType {
    /// The wire tag of this kind (e.g. `"email"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element kind of an array field. There is no array variant: arrays of
/// arrays cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Text,
    Email,
    Password,
    Number,
}

impl ItemType {
    /// The corresponding scalar field kind.
    pub fn as_field_type(&self) -> FieldType {
        match self {
            Self::Text => FieldType::Text,
            Self::Email => FieldType::Email,
            Self::Password => FieldType::Password,
            Self::Number => FieldType::Number,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_field_type().fmt(f)
    }
}

/// Single-value predicate attached in code. `Err` carries the message shown
/// to the user.
pub type CustomRule = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Predicate that may look at the rest of the submitted record.
pub type CrossFieldRule = Arc<dyn Fn(&Value, &Record) -> Result<(), String> + Send + Sync>;

/// Optional extra rules for a field.
///
/// `pattern`, the length bounds, and `message` are declarative and
/// round-trip through JSON. `custom` and `cross_field` are code and are
/// never serialized.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Regular expression a string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Replaces the default message of a pattern failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub custom: Option<CustomRule>,
    #[serde(skip)]
    pub cross_field: Option<CrossFieldRule>,
}

impl fmt::Debug for FieldValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidation")
            .field("pattern", &self.pattern)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("message", &self.message)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .field("cross_field", &self.cross_field.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Attributes shared by every field variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCommon {
    /// Display name.
    pub label: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Help text shown under the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pre-fill value. Never injected by the validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldCommon {
    fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Free-form single-line text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            common: FieldCommon::labelled(label),
            ..Self::default()
        }
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }
}

/// One email address, or a comma-separated list when `allow_multiple`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_multiple: bool,
}

impl EmailField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            common: FieldCommon::labelled(label),
            ..Self::default()
        }
    }

    pub fn allow_multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }
}

/// Secret text. The strength meter and reveal toggle are presentation only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_strength_indicator: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub show_toggle: bool,
}

impl PasswordField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            common: FieldCommon::labelled(label),
            ..Self::default()
        }
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn strength_indicator(mut self) -> Self {
        self.show_strength_indicator = true;
        self
    }

    pub fn toggle(mut self) -> Self {
        self.show_toggle = true;
        self
    }
}

/// Numeric input with optional inclusive bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Input increment. Presentation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Suffix shown inside the input (e.g. `"kg"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl NumberField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            common: FieldCommon::labelled(label),
            ..Self::default()
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Both bounds at once, inclusive.
    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A list of scalar items, all of one `ItemType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayField {
    #[serde(flatten)]
    pub common: FieldCommon,
    pub items_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Allow drag/move reordering. Presentation only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sortable: bool,
}

impl ArrayField {
    pub fn new(label: impl Into<String>, items_type: ItemType) -> Self {
        Self {
            common: FieldCommon::labelled(label),
            items_type,
            min_items: None,
            max_items: None,
            sortable: false,
        }
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// One named input definition, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Field {
    Text(TextField),
    Email(EmailField),
    Password(PasswordField),
    Number(NumberField),
    Array(ArrayField),
}

impl Field {
    pub fn text(label: impl Into<String>) -> Self {
        Self::Text(TextField::new(label))
    }

    pub fn email(label: impl Into<String>) -> Self {
        Self::Email(EmailField::new(label))
    }

    pub fn password(label: impl Into<String>) -> Self {
        Self::Password(PasswordField::new(label))
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::Number(NumberField::new(label))
    }

    pub fn array(label: impl Into<String>, items_type: ItemType) -> Self {
        Self::Array(ArrayField::new(label, items_type))
    }

    /// The active type tag.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Email(_) => FieldType::Email,
            Self::Password(_) => FieldType::Password,
            Self::Number(_) => FieldType::Number,
            Self::Array(_) => FieldType::Array,
        }
    }

    pub fn common(&self) -> &FieldCommon {
        match self {
            Self::Text(f) => &f.common,
            Self::Email(f) => &f.common,
            Self::Password(f) => &f.common,
            Self::Number(f) => &f.common,
            Self::Array(f) => &f.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut FieldCommon {
        match self {
            Self::Text(f) => &mut f.common,
            Self::Email(f) => &mut f.common,
            Self::Password(f) => &mut f.common,
            Self::Number(f) => &mut f.common,
            Self::Array(f) => &mut f.common,
        }
    }

    pub fn label(&self) -> &str {
        &self.common().label
    }

    pub fn is_required(&self) -> bool {
        self.common().required
    }

    pub fn validation(&self) -> Option<&FieldValidation> {
        self.common().validation.as_ref()
    }

    // ── Builders for common attributes ───────────────────────────────

    pub fn required(mut self) -> Self {
        self.common_mut().required = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.common_mut().disabled = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.common_mut().description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.common_mut().default = Some(default.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.common_mut().placeholder = Some(placeholder.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.common_mut().class_name = Some(class_name.into());
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.common_mut().validation = Some(validation);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.validation_mut().pattern = Some(pattern.into());
        self
    }

    /// Attach a single-value predicate, run after the built-in rules.
    pub fn with_custom_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validation_mut().custom = Some(Arc::new(rule));
        self
    }

    /// Attach a predicate that also sees the whole submitted record.
    pub fn with_cross_field_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Value, &Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validation_mut().cross_field = Some(Arc::new(rule));
        self
    }

    fn validation_mut(&mut self) -> &mut FieldValidation {
        self.common_mut()
            .validation
            .get_or_insert_with(FieldValidation::default)
    }
}

impl From<TextField> for Field {
    fn from(f: TextField) -> Self {
        Self::Text(f)
    }
}

impl From<EmailField> for Field {
    fn from(f: EmailField) -> Self {
        Self::Email(f)
    }
}

impl From<PasswordField> for Field {
    fn from(f: PasswordField) -> Self {
        Self::Password(f)
    }
}

impl From<NumberField> for Field {
    fn from(f: NumberField) -> Self {
        Self::Number(f)
    }
}

impl From<ArrayField> for Field {
    fn from(f: ArrayField) -> Self {
        Self::Array(f)
    }
}
