//! # Rendering Dispatch
//!
//! Maps each schema field to one presentational widget. The widgets are
//! serializable view models: a host UI (HTML templates, a TUI, a WASM
//! front end) draws them and feeds user input back through
//! [`FormSession`](crate::FormSession).
//!
//! | Field type | Widget | Presentation rules |
//! |------------|--------|--------------------|
//! | text | `TextWidget` | length attributes |
//! | email | `EmailWidget` | multiple-address hint and placeholder |
//! | password | `PasswordWidget` | reveal toggle, strength meter |
//! | number | `NumberWidget` | bounds, step, unit suffix |
//! | array | `ArrayWidget` | add/remove availability, move up/down |
//!
//! Widgets carry no validation logic. The error they show is whatever the
//! validator produced for their field.

use formkit_core::{Field, FieldCommon, FormSchema, ItemType, Styling};
use formkit_schema::ValidationError;
use serde::Serialize;
use serde_json::Value;

use crate::state::FormState;

const EMAIL_PLACEHOLDER: &str = "email@example.com";
const EMAILS_PLACEHOLDER: &str = "email1@example.com, email2@example.com";
const PASSWORD_PLACEHOLDER: &str = "••••••••";
const EMAILS_HINT: &str = "Separate multiple email addresses with commas";

/// Label, help text, error message, and class hooks around every input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFrame {
    /// Input id, equal to the field name.
    pub id: String,
    pub label: String,
    /// Show a required marker next to the label.
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
}

/// Attributes of the input element itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputAttrs {
    /// HTML input type (`text`, `email`, `password`, `number`).
    pub input_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// The field currently has an error.
    pub invalid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWidget {
    pub frame: FieldFrame,
    pub input: InputAttrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailWidget {
    pub frame: FieldFrame,
    pub input: InputAttrs,
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Fair,
    Strong,
}

impl StrengthLevel {
    /// Level for a 0–5 score.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => Self::Weak,
            2 | 3 => Self::Fair,
            _ => Self::Strong,
        }
    }
}

/// Meter text for each score, indexed 0 to 5.
const STRENGTH_LABELS: [&str; 6] = ["Very weak", "Weak", "Fair", "Good", "Strong", "Very strong"];

/// Meter text for a score. Scores above 5 read as the top label.
pub fn strength_label(score: u8) -> &'static str {
    STRENGTH_LABELS[usize::from(score).min(STRENGTH_LABELS.len() - 1)]
}

/// Password strength meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Strength {
    /// 0 to 5.
    pub score: u8,
    pub level: StrengthLevel,
    pub label: &'static str,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        Self {
            score,
            level: StrengthLevel::from_score(score),
            label: strength_label(score),
        }
    }
}

/// One point each for: at least 8 characters, an uppercase letter, a
/// lowercase letter, a digit, a symbol.
///
/// Display only; never used to accept or reject a password.
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|&&passed| passed).count() as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordWidget {
    pub frame: FieldFrame,
    pub input: InputAttrs,
    /// `Some(revealed)` when the show/hide toggle is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle: Option<bool>,
    /// Present when the strength indicator is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<Strength>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberWidget {
    pub frame: FieldFrame,
    pub input: InputAttrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub step: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayItem {
    pub index: usize,
    pub value: Value,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayWidget {
    pub frame: FieldFrame,
    /// Template for each item input; `value` is unset.
    pub item_input: InputAttrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_step: Option<f64>,
    pub items: Vec<ArrayItem>,
    pub sortable: bool,
    pub can_add: bool,
    pub can_remove: bool,
    pub add_label: String,
    pub hints: Vec<String>,
}

/// View model of one field, tagged by `widget`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "lowercase")]
pub enum Widget {
    Text(TextWidget),
    Email(EmailWidget),
    Password(PasswordWidget),
    Number(NumberWidget),
    Array(ArrayWidget),
}

impl Widget {
    pub fn frame(&self) -> &FieldFrame {
        match self {
            Self::Text(w) => &w.frame,
            Self::Email(w) => &w.frame,
            Self::Password(w) => &w.frame,
            Self::Number(w) => &w.frame,
            Self::Array(w) => &w.frame,
        }
    }
}

fn frame(
    name: &str,
    common: &FieldCommon,
    error: Option<&ValidationError>,
    styling: &Styling,
) -> FieldFrame {
    FieldFrame {
        id: name.to_string(),
        label: common.label.clone(),
        required: common.required,
        description: common.description.clone(),
        error: error.map(|e| e.message.clone()),
        wrapper_class: styling.field_class_name.clone(),
        label_class: styling.label_class_name.clone(),
        error_class: styling.error_class_name.clone(),
    }
}

fn input(
    input_type: &'static str,
    common: &FieldCommon,
    placeholder: Option<String>,
    invalid: bool,
    value: Option<&Value>,
) -> InputAttrs {
    InputAttrs {
        input_type,
        placeholder,
        disabled: common.disabled,
        class_name: common.class_name.clone(),
        invalid,
        value: value.cloned(),
    }
}

fn item_input_type(items_type: ItemType) -> &'static str {
    match items_type {
        ItemType::Text => "text",
        ItemType::Email => "email",
        ItemType::Password => "password",
        ItemType::Number => "number",
    }
}

/// Build the widget for one field.
///
/// `value` is the field's current value and `error` its current validation
/// error, both taken from the interaction state. `revealed` only matters
/// for password fields with a toggle.
pub fn widget_for(
    name: &str,
    field: &Field,
    value: Option<&Value>,
    error: Option<&ValidationError>,
    styling: &Styling,
    revealed: bool,
) -> Widget {
    let common = field.common();
    let framed = frame(name, common, error, styling);
    let invalid = error.is_some();

    match field {
        Field::Text(f) => Widget::Text(TextWidget {
            frame: framed,
            input: input("text", common, common.placeholder.clone(), invalid, value),
            min_length: f.min_length,
            max_length: f.max_length,
        }),
        Field::Email(f) => {
            let placeholder = common.placeholder.clone().unwrap_or_else(|| {
                if f.allow_multiple {
                    EMAILS_PLACEHOLDER.to_string()
                } else {
                    EMAIL_PLACEHOLDER.to_string()
                }
            });
            Widget::Email(EmailWidget {
                frame: framed,
                input: input("email", common, Some(placeholder), invalid, value),
                multiple: f.allow_multiple,
                hint: (f.allow_multiple && !invalid).then(|| EMAILS_HINT.to_string()),
            })
        }
        Field::Password(f) => {
            let shown = f.show_toggle && revealed;
            let placeholder = common
                .placeholder
                .clone()
                .unwrap_or_else(|| PASSWORD_PLACEHOLDER.to_string());
            let strength = f.show_strength_indicator.then(|| {
                let score = value
                    .and_then(Value::as_str)
                    .map(password_strength)
                    .unwrap_or(0);
                Strength::from_score(score)
            });
            Widget::Password(PasswordWidget {
                frame: framed,
                input: input(
                    if shown { "text" } else { "password" },
                    common,
                    Some(placeholder),
                    invalid,
                    value,
                ),
                toggle: f.show_toggle.then_some(shown),
                strength,
            })
        }
        Field::Number(f) => Widget::Number(NumberWidget {
            frame: framed,
            input: input("number", common, common.placeholder.clone(), invalid, value),
            min: f.min,
            max: f.max,
            step: f.step.unwrap_or(1.0),
            unit: f.unit.clone(),
        }),
        Field::Array(f) => {
            let items: &[Value] = match value {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[][..],
            };
            let len = items.len();
            let noun = common.label.to_lowercase();
            let mut hints = Vec::new();
            if let Some(min) = f.min_items {
                if len < min {
                    hints.push(format!("At least {min} {noun} required"));
                }
            }
            if let Some(max) = f.max_items {
                if len >= max {
                    hints.push(format!("Maximum {max} {noun} allowed"));
                }
            }
            Widget::Array(ArrayWidget {
                frame: framed,
                item_input: input(
                    item_input_type(f.items_type),
                    common,
                    common.placeholder.clone(),
                    invalid,
                    None,
                ),
                item_step: (f.items_type == ItemType::Number).then_some(1.0),
                items: items
                    .iter()
                    .enumerate()
                    .map(|(index, v)| ArrayItem {
                        index,
                        value: v.clone(),
                        can_move_up: f.sortable && index > 0,
                        can_move_down: f.sortable && index + 1 < len,
                    })
                    .collect(),
                sortable: f.sortable,
                can_add: f.max_items.map_or(true, |max| len < max),
                can_remove: len > 0 && f.min_items.map_or(true, |min| len > min),
                add_label: format!("Add {}", common.label),
                hints,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub label: String,
    pub enabled: bool,
}

/// View model of a whole form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Widgets in display order.
    pub fields: Vec<Widget>,
    pub reset: ButtonState,
    pub submit: ButtonState,
}

impl FormView {
    /// Build the view of `schema` in its current `state`.
    ///
    /// `is_valid` is whether the current values pass the validator; submit
    /// is only enabled for a dirty, valid form that is not already
    /// submitting.
    pub fn build(schema: &FormSchema, state: &FormState, is_valid: bool) -> Self {
        let default_styling = Styling::default();
        let styling = schema.styling.as_ref().unwrap_or(&default_styling);
        let submitting = state.is_submitting();
        let dirty = state.is_dirty();

        let fields = schema
            .fields()
            .map(|(name, field)| {
                widget_for(
                    name,
                    field,
                    state.value(name),
                    state.error_for(name),
                    styling,
                    state.is_revealed(name),
                )
            })
            .collect();

        Self {
            title: schema.title.clone(),
            description: schema.description.clone(),
            class_name: styling.class_name.clone(),
            fields,
            reset: ButtonState {
                label: "Reset".to_string(),
                enabled: dirty && !submitting,
            },
            submit: ButtonState {
                label: if submitting { "Submitting..." } else { "Submit" }.to_string(),
                enabled: dirty && is_valid && !submitting,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::{ArrayField, EmailField, NumberField, PasswordField};
    use formkit_schema::ValidationErrorKind;
    use serde_json::json;

    fn plain(field: &Field, value: Option<Value>) -> Widget {
        widget_for("f", field, value.as_ref(), None, &Styling::default(), false)
    }

    #[test]
    fn each_field_type_maps_to_its_widget() {
        let cases = [
            (Field::text("T"), "text"),
            (Field::email("E"), "email"),
            (Field::password("P"), "password"),
            (Field::number("N"), "number"),
            (Field::array("A", ItemType::Text), "array"),
        ];
        for (field, tag) in cases {
            let widget = plain(&field, None);
            let json = serde_json::to_value(&widget).unwrap();
            assert_eq!(json["widget"], json!(tag));
            assert_eq!(widget.frame().label, field.label());
        }
    }

    #[test]
    fn frame_carries_error_and_styling_hooks() {
        let styling = Styling {
            field_class_name: Some("row".into()),
            label_class_name: Some("lbl".into()),
            error_class_name: Some("err".into()),
            ..Styling::default()
        };
        let error = ValidationError::new(ValidationErrorKind::RequiredMissing, "Name is required");
        let field = Field::text("Name").required().with_description("Your full name");
        let widget = widget_for("name", &field, None, Some(&error), &styling, false);
        let frame = widget.frame();
        assert_eq!(frame.id, "name");
        assert!(frame.required);
        assert_eq!(frame.description.as_deref(), Some("Your full name"));
        assert_eq!(frame.error.as_deref(), Some("Name is required"));
        assert_eq!(frame.wrapper_class.as_deref(), Some("row"));
        assert_eq!(frame.error_class.as_deref(), Some("err"));
        match widget {
            Widget::Text(w) => assert!(w.input.invalid),
            other => panic!("expected text widget, got {other:?}"),
        }
    }

    #[test]
    fn email_hint_only_for_multiple_without_error() {
        let field = Field::from(EmailField::new("CC").allow_multiple());
        match plain(&field, None) {
            Widget::Email(w) => {
                assert!(w.multiple);
                assert_eq!(w.hint.as_deref(), Some(EMAILS_HINT));
                assert_eq!(w.input.placeholder.as_deref(), Some(EMAILS_PLACEHOLDER));
            }
            other => panic!("expected email widget, got {other:?}"),
        }

        let error = ValidationError::new(ValidationErrorKind::PatternMismatch, "bad");
        match widget_for("cc", &field, None, Some(&error), &Styling::default(), false) {
            Widget::Email(w) => assert!(w.hint.is_none()),
            other => panic!("expected email widget, got {other:?}"),
        }
    }

    #[test]
    fn password_strength_scores() {
        assert_eq!(password_strength(""), 0);
        assert_eq!(password_strength("abc"), 1);
        assert_eq!(password_strength("abcdefgh"), 2);
        assert_eq!(password_strength("Abcdefg1"), 4);
        assert_eq!(password_strength("Abcdefg1!"), 5);
        assert_eq!(StrengthLevel::from_score(1), StrengthLevel::Weak);
        assert_eq!(StrengthLevel::from_score(3), StrengthLevel::Fair);
        assert_eq!(StrengthLevel::from_score(5), StrengthLevel::Strong);
    }

    #[test]
    fn strength_labels_follow_the_score() {
        let labels: Vec<&str> = (0..=5).map(strength_label).collect();
        assert_eq!(
            labels,
            vec!["Very weak", "Weak", "Fair", "Good", "Strong", "Very strong"]
        );
        assert_eq!(strength_label(9), "Very strong");

        let reading = Strength::from_score(password_strength("abcdefgh"));
        assert_eq!(reading.label, "Fair");
        assert_eq!(reading.level, StrengthLevel::Fair);
        assert_eq!(
            serde_json::to_value(reading).unwrap(),
            json!({ "score": 2, "level": "fair", "label": "Fair" })
        );
    }

    #[test]
    fn password_toggle_and_meter() {
        let field = Field::from(PasswordField::new("Password").strength_indicator().toggle());
        let value = json!("Abcdefg1!");
        match widget_for("pw", &field, Some(&value), None, &Styling::default(), true) {
            Widget::Password(w) => {
                assert_eq!(w.input.input_type, "text");
                assert_eq!(w.toggle, Some(true));
                assert_eq!(
                    w.strength,
                    Some(Strength {
                        score: 5,
                        level: StrengthLevel::Strong,
                        label: "Very strong",
                    })
                );
            }
            other => panic!("expected password widget, got {other:?}"),
        }

        let hidden = Field::password("Password");
        match widget_for("pw", &hidden, Some(&value), None, &Styling::default(), true) {
            Widget::Password(w) => {
                assert_eq!(w.input.input_type, "password");
                assert!(w.toggle.is_none());
                assert!(w.strength.is_none());
                assert_eq!(w.input.placeholder.as_deref(), Some(PASSWORD_PLACEHOLDER));
            }
            other => panic!("expected password widget, got {other:?}"),
        }
    }

    #[test]
    fn number_widget_defaults_step() {
        let field = Field::from(NumberField::new("Weight").range(0.0, 500.0).unit("kg"));
        match plain(&field, Some(json!(70))) {
            Widget::Number(w) => {
                assert_eq!(w.step, 1.0);
                assert_eq!(w.unit.as_deref(), Some("kg"));
                assert_eq!(w.max, Some(500.0));
                assert_eq!(w.input.value, Some(json!(70)));
            }
            other => panic!("expected number widget, got {other:?}"),
        }
    }

    #[test]
    fn array_widget_limits_and_moves() {
        let field = Field::from(
            ArrayField::new("Tags", ItemType::Number)
                .min_items(2)
                .max_items(3)
                .sortable(),
        );

        match plain(&field, Some(json!([1]))) {
            Widget::Array(w) => {
                assert!(w.can_add);
                assert!(!w.can_remove);
                assert_eq!(w.hints, vec!["At least 2 tags required".to_string()]);
                assert_eq!(w.item_input.input_type, "number");
                assert_eq!(w.item_step, Some(1.0));
                assert_eq!(w.add_label, "Add Tags");
            }
            other => panic!("expected array widget, got {other:?}"),
        }

        match plain(&field, Some(json!([1, 2, 3]))) {
            Widget::Array(w) => {
                assert!(!w.can_add);
                assert!(w.can_remove);
                assert_eq!(w.hints, vec!["Maximum 3 tags allowed".to_string()]);
                let moves: Vec<(bool, bool)> = w
                    .items
                    .iter()
                    .map(|i| (i.can_move_up, i.can_move_down))
                    .collect();
                assert_eq!(moves, vec![(false, true), (true, true), (true, false)]);
            }
            other => panic!("expected array widget, got {other:?}"),
        }
    }

    #[test]
    fn unsortable_arrays_never_move() {
        let field = Field::array("Tags", ItemType::Text);
        match plain(&field, Some(json!(["a", "b"]))) {
            Widget::Array(w) => {
                assert!(w.items.iter().all(|i| !i.can_move_up && !i.can_move_down));
            }
            other => panic!("expected array widget, got {other:?}"),
        }
    }

    #[test]
    fn form_view_buttons_follow_state() {
        let schema = FormSchema::new()
            .with_title("Signup")
            .with_field("name", Field::text("Name").required())
            .unwrap();
        let mut state = FormState::new(&schema);

        let pristine = FormView::build(&schema, &state, false);
        assert_eq!(pristine.title.as_deref(), Some("Signup"));
        assert!(!pristine.reset.enabled);
        assert!(!pristine.submit.enabled);

        state.set_value("name", "Ada").unwrap();
        let ready = FormView::build(&schema, &state, true);
        assert!(ready.reset.enabled);
        assert!(ready.submit.enabled);
        assert_eq!(ready.submit.label, "Submit");

        state.set_submitting(true);
        let busy = FormView::build(&schema, &state, true);
        assert!(!busy.submit.enabled);
        assert!(!busy.reset.enabled);
        assert_eq!(busy.submit.label, "Submitting...");
    }
}
