//! # Submission Lifecycle
//!
//! A [`FormSession`] ties one schema to its compiled validator and one
//! interaction state, and runs the submit sequence:
//!
//! ```text
//!   busy? ──yes──▶ Busy
//!    │no
//!    ▼
//!   field rules ──fail──▶ on_error(errors) ─▶ Invalid
//!    │ok
//!    ▼
//!   on_validate ──false──▶ on_error({}) ─▶ Rejected
//!    │true        ──err───▶ on_error({}) ─▶ Failed
//!    ▼
//!   handler ──err──▶ on_error({}) ─▶ Failed
//!    │ok
//!    ▼
//!   on_change(data), reset ─▶ Submitted
//! ```
//!
//! The busy flag is released on every exit path, including a dropped
//! future. The state lock is never held across an await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use formkit_core::{FormSchema, Record, SchemaError};
use formkit_schema::{compile, FormValidator, ValidationError, ValidationErrors};
use parking_lot::Mutex;
use serde_json::Value;

use crate::render::FormView;
use crate::state::{FormState, StateError};

/// Hooks invoked by the submission lifecycle. All have no-op defaults.
#[async_trait]
pub trait FormCallbacks: Send + Sync {
    /// Whole-record gate run after the field rules pass. Returning
    /// `Ok(false)` rejects the submission without calling the handler.
    async fn on_validate(&self, _data: &Record) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Called with the submitted data after the handler succeeds.
    fn on_change(&self, _data: &Record) {}

    /// Called when a submission does not go through. The mapping is empty
    /// when the failure did not come from the field rules.
    fn on_error(&self, _errors: &ValidationErrors) {}
}

/// Receives validated data. Supplied per submit call.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, data: &Record) -> anyhow::Result<()>;
}

#[async_trait]
impl<F> SubmitHandler for F
where
    F: Fn(&Record) -> anyhow::Result<()> + Send + Sync,
{
    async fn submit(&self, data: &Record) -> anyhow::Result<()> {
        self(data)
    }
}

/// How a call to [`FormSession::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The handler accepted the data; the state has been reset.
    Submitted(Record),
    /// One or more field rules failed.
    Invalid(ValidationErrors),
    /// `on_validate` returned false.
    Rejected,
    /// `on_validate` or the handler returned an error.
    Failed(String),
    /// Another submission is in flight.
    Busy,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

pub struct FormSession {
    schema: FormSchema,
    validator: FormValidator,
    callbacks: Option<Arc<dyn FormCallbacks>>,
    state: Mutex<FormState>,
    submitting: AtomicBool,
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("fields", &self.schema.len())
            .field("callbacks", &self.callbacks.is_some())
            .field("submitting", &self.is_submitting())
            .finish()
    }
}

impl FormSession {
    /// Compile `schema` and start from its defaults.
    ///
    /// # Errors
    ///
    /// Returns the schema's construction error.
    pub fn new(schema: FormSchema) -> Result<Self, SchemaError> {
        let validator = compile(&schema)?;
        let state = FormState::new(&schema);
        Ok(Self {
            schema,
            validator,
            callbacks: None,
            state: Mutex::new(state),
            submitting: AtomicBool::new(false),
        })
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn FormCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    /// Snapshot of the interaction state.
    pub fn state(&self) -> FormState {
        self.state.lock().clone()
    }

    /// Swap in a new schema. The validator is rebuilt and the interaction
    /// state starts over from the new defaults.
    ///
    /// # Errors
    ///
    /// Returns the new schema's construction error; the session is left
    /// unchanged.
    pub fn replace_schema(&mut self, schema: FormSchema) -> Result<(), SchemaError> {
        let validator = compile(&schema)?;
        *self.state.get_mut() = FormState::new(&schema);
        self.schema = schema;
        self.validator = validator;
        tracing::debug!(fields = self.schema.len(), "form schema replaced");
        Ok(())
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// Record a new value and re-check that field.
    ///
    /// Returns the field's current error, if any.
    pub fn change(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<ValidationError>, StateError> {
        let mut state = self.state.lock();
        state.set_value(name, value)?;
        Ok(self.revalidate(&mut state, name))
    }

    pub fn touch(&self, name: &str) -> Result<(), StateError> {
        self.state.lock().touch(name)
    }

    pub fn append_item(
        &self,
        name: &str,
        item: impl Into<Value>,
    ) -> Result<Option<ValidationError>, StateError> {
        let mut state = self.state.lock();
        state.append_item(name, item)?;
        Ok(self.revalidate(&mut state, name))
    }

    pub fn remove_item(&self, name: &str, index: usize) -> Result<Value, StateError> {
        let mut state = self.state.lock();
        let removed = state.remove_item(name, index)?;
        self.revalidate(&mut state, name);
        Ok(removed)
    }

    pub fn move_item(&self, name: &str, from: usize, to: usize) -> Result<(), StateError> {
        let mut state = self.state.lock();
        state.move_item(name, from, to)?;
        self.revalidate(&mut state, name);
        Ok(())
    }

    pub fn toggle_reveal(&self, name: &str) -> Result<bool, StateError> {
        self.state.lock().toggle_reveal(name)
    }

    /// Take the values of `record` as they are, without default pre-fill.
    /// Used when a whole record arrives at once rather than through
    /// individual changes.
    pub fn replace_values(&self, record: Record) {
        self.state.lock().replace_values(record);
    }

    /// Back to defaults.
    pub fn reset(&self) {
        self.state.lock().reset();
    }

    fn revalidate(&self, state: &mut FormState, name: &str) -> Option<ValidationError> {
        let error = self.validator.validate_field(name, state.values()).err();
        state.set_field_error(name, error.clone());
        error
    }

    /// Whether the current values pass every field rule.
    pub fn is_valid(&self) -> bool {
        let values = self.state.lock().values().clone();
        self.validator.validate(&values).is_ok()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// View model of the form in its current state.
    pub fn view(&self) -> FormView {
        let state = self.state();
        let valid = self.validator.validate(state.values()).is_ok();
        FormView::build(&self.schema, &state, valid)
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Run the submission sequence with the current values.
    pub async fn submit(&self, handler: &dyn SubmitHandler) -> SubmitOutcome {
        let Some(_busy) = BusyGuard::acquire(self) else {
            tracing::debug!("submit ignored, another submission is in flight");
            return SubmitOutcome::Busy;
        };

        let snapshot = self.state.lock().values().clone();
        let data = match self.validator.validate(&snapshot) {
            Ok(data) => data,
            Err(errors) => {
                tracing::info!(failed = errors.len(), "submission blocked by field rules");
                self.state.lock().set_errors(errors.clone());
                self.report(&errors);
                return SubmitOutcome::Invalid(errors);
            }
        };
        self.state.lock().set_errors(ValidationErrors::new());

        if let Some(callbacks) = &self.callbacks {
            match callbacks.on_validate(&data).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("submission rejected by on_validate");
                    self.report(&ValidationErrors::new());
                    return SubmitOutcome::Rejected;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "on_validate failed");
                    self.report(&ValidationErrors::new());
                    return SubmitOutcome::Failed(format!("{e:#}"));
                }
            }
        }

        if let Err(e) = handler.submit(&data).await {
            tracing::warn!(error = %e, "submit handler failed");
            self.report(&ValidationErrors::new());
            return SubmitOutcome::Failed(format!("{e:#}"));
        }

        if let Some(callbacks) = &self.callbacks {
            callbacks.on_change(&data);
        }
        self.state.lock().reset();
        tracing::info!(fields = data.len(), "form submitted");
        SubmitOutcome::Submitted(data)
    }

    fn report(&self, errors: &ValidationErrors) {
        if let Some(callbacks) = &self.callbacks {
            callbacks.on_error(errors);
        }
    }
}

/// Holds the busy flag for one submission and releases it on drop.
struct BusyGuard<'a> {
    session: &'a FormSession,
}

impl<'a> BusyGuard<'a> {
    fn acquire(session: &'a FormSession) -> Option<Self> {
        session
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        session.state.lock().set_submitting(true);
        Some(Self { session })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.state.lock().set_submitting(false);
        self.session.submitting.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::{Field, NumberField};
    use formkit_schema::ValidationErrorKind;
    use serde_json::json;

    fn session() -> FormSession {
        let schema = FormSchema::new()
            .with_field("name", Field::text("Name").required())
            .unwrap()
            .with_field("age", NumberField::new("Age").range(18.0, 120.0))
            .unwrap();
        FormSession::new(schema).unwrap()
    }

    #[test]
    fn change_revalidates_the_field() {
        let s = session();
        let error = s.change("age", 17).unwrap().unwrap();
        assert_eq!(error.kind, ValidationErrorKind::RangeViolation);
        assert!(s.state().error_for("age").is_some());

        assert!(s.change("age", 30).unwrap().is_none());
        assert!(s.state().error_for("age").is_none());
    }

    #[test]
    fn change_to_unknown_field_is_rejected() {
        let s = session();
        assert_eq!(
            s.change("nope", 1).unwrap_err(),
            StateError::UnknownField("nope".into())
        );
    }

    #[test]
    fn is_valid_reflects_current_values() {
        let s = session();
        assert!(!s.is_valid());
        s.change("name", "Ada").unwrap();
        assert!(s.is_valid());
        assert!(s.view().submit.enabled);
    }

    #[test]
    fn malformed_schema_fails_session_construction() {
        let schema = FormSchema::new()
            .with_field("age", NumberField::new("Age").range(10.0, 1.0))
            .unwrap();
        assert!(FormSession::new(schema).unwrap_err().is_malformed());
    }

    #[test]
    fn replace_schema_starts_over() {
        let mut s = session();
        s.change("name", "Ada").unwrap();
        let next = FormSchema::new()
            .with_field("city", Field::text("City").with_default("Paris"))
            .unwrap();
        s.replace_schema(next).unwrap();
        assert_eq!(s.state().value("city"), Some(&json!("Paris")));
        assert!(s.state().value("name").is_none());
        assert!(s.validator().contains("city"));
    }

    #[tokio::test]
    async fn closure_handlers_receive_normalized_data() {
        let s = session();
        s.change("name", "Ada").unwrap();
        s.change("age", "42").unwrap();
        let handler = |data: &Record| -> anyhow::Result<()> {
            assert_eq!(data.get("age"), Some(&json!(42)));
            Ok(())
        };
        assert!(s.submit(&handler).await.is_submitted());
    }
}
