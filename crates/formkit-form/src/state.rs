//! # Interaction State
//!
//! `FormState` is the caller-owned object that tracks what the user has
//! done to one form instance. The validator never reads it; the session
//! snapshots its values before validating.
//!
//! A field is dirty when its current value differs from its default, so
//! editing a value back to the default clears it. Touched fields stay
//! touched until `reset`.

use std::collections::{BTreeMap, BTreeSet};

use formkit_core::{Field, FormSchema, Record};
use formkit_schema::{ValidationError, ValidationErrors};
use serde_json::Value;
use thiserror::Error;

/// Rejected interaction with the state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is not an array field")]
    NotAnArray(String),

    #[error("field '{field}' allows at most {max} items")]
    TooManyItems { field: String, max: usize },

    #[error("field '{field}' requires at least {min} items")]
    TooFewItems { field: String, min: usize },

    #[error("index {index} is out of bounds for field '{field}' with {len} items")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct ItemLimits {
    min: Option<usize>,
    max: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FormState {
    defaults: Record,
    values: Record,
    fields: BTreeSet<String>,
    arrays: BTreeMap<String, ItemLimits>,
    touched: BTreeSet<String>,
    revealed: BTreeSet<String>,
    errors: ValidationErrors,
    submitting: bool,
}

impl FormState {
    /// Fresh state for `schema`, pre-filled from field defaults.
    pub fn new(schema: &FormSchema) -> Self {
        let mut defaults = Record::new();
        let mut fields = BTreeSet::new();
        let mut arrays = BTreeMap::new();

        for (name, field) in schema.fields() {
            fields.insert(name.to_string());
            if let Some(default) = &field.common().default {
                defaults.insert(name.to_string(), default.clone());
            }
            if let Field::Array(a) = field {
                arrays.insert(
                    name.to_string(),
                    ItemLimits {
                        min: a.min_items,
                        max: a.max_items,
                    },
                );
            }
        }

        Self {
            values: defaults.clone(),
            defaults,
            fields,
            arrays,
            touched: BTreeSet::new(),
            revealed: BTreeSet::new(),
            errors: ValidationErrors::new(),
            submitting: false,
        }
    }

    fn ensure_known(&self, name: &str) -> Result<(), StateError> {
        if self.fields.contains(name) {
            Ok(())
        } else {
            Err(StateError::UnknownField(name.to_string()))
        }
    }

    // ── Values ───────────────────────────────────────────────────────

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    /// Replace all values with `record`. Keys the schema does not declare
    /// are dropped and defaults are not filled in, so a field missing from
    /// `record` has no value. Given keys are marked touched; errors are
    /// cleared.
    pub fn replace_values(&mut self, record: Record) {
        let values: Record = record
            .into_iter()
            .filter(|(name, _)| self.fields.contains(name))
            .collect();
        self.touched.extend(values.keys().cloned());
        self.values = values;
        self.errors = ValidationErrors::new();
    }

    /// Set a field's value and mark it touched.
    ///
    /// # Errors
    ///
    /// `StateError::UnknownField` if the schema has no such field.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), StateError> {
        self.ensure_known(name)?;
        self.values.insert(name.to_string(), value.into());
        self.touched.insert(name.to_string());
        Ok(())
    }

    /// Mark a field as visited without changing it.
    ///
    /// # Errors
    ///
    /// `StateError::UnknownField` if the schema has no such field.
    pub fn touch(&mut self, name: &str) -> Result<(), StateError> {
        self.ensure_known(name)?;
        self.touched.insert(name.to_string());
        Ok(())
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn is_field_dirty(&self, name: &str) -> bool {
        self.values.get(name) != self.defaults.get(name)
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(|name| self.is_field_dirty(name))
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|name| self.is_field_dirty(name))
            .map(String::as_str)
    }

    // ── Errors ───────────────────────────────────────────────────────

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error_for(&self, name: &str) -> Option<&ValidationError> {
        self.errors.get(name)
    }

    pub fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    /// Replace one field's error; `None` clears it.
    pub fn set_field_error(&mut self, name: &str, error: Option<ValidationError>) {
        match error {
            Some(error) => self.errors.insert(name, error),
            None => {
                self.errors.remove(name);
            }
        }
    }

    /// True when no field currently shows an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    // ── Presentation toggles ─────────────────────────────────────────

    /// Flip a password field between hidden and revealed.
    ///
    /// # Errors
    ///
    /// `StateError::UnknownField` if the schema has no such field.
    pub fn toggle_reveal(&mut self, name: &str) -> Result<bool, StateError> {
        self.ensure_known(name)?;
        if self.revealed.remove(name) {
            Ok(false)
        } else {
            self.revealed.insert(name.to_string());
            Ok(true)
        }
    }

    pub fn is_revealed(&self, name: &str) -> bool {
        self.revealed.contains(name)
    }

    // ── Submission flag ──────────────────────────────────────────────

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Restore defaults and forget touched fields, errors, and reveals.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.touched.clear();
        self.revealed.clear();
        self.errors = ValidationErrors::new();
    }

    // ── Array items ──────────────────────────────────────────────────

    fn limits(&self, name: &str) -> Result<ItemLimits, StateError> {
        self.ensure_known(name)?;
        self.arrays
            .get(name)
            .copied()
            .ok_or_else(|| StateError::NotAnArray(name.to_string()))
    }

    /// Items of an array field. An unset array has no items.
    ///
    /// # Errors
    ///
    /// `StateError::NotAnArray` if the field is not an array field or its
    /// current value is not a list.
    pub fn items(&self, name: &str) -> Result<&[Value], StateError> {
        self.limits(name)?;
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(&[][..]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(StateError::NotAnArray(name.to_string())),
        }
    }

    pub fn can_append(&self, name: &str) -> bool {
        match (self.limits(name), self.items(name)) {
            (Ok(limits), Ok(items)) => limits.max.map_or(true, |max| items.len() < max),
            _ => false,
        }
    }

    pub fn can_remove(&self, name: &str) -> bool {
        match (self.limits(name), self.items(name)) {
            (Ok(limits), Ok(items)) => {
                !items.is_empty() && limits.min.map_or(true, |min| items.len() > min)
            }
            _ => false,
        }
    }

    fn items_mut(&mut self, name: &str) -> Result<&mut Vec<Value>, StateError> {
        let slot = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut()
            .ok_or_else(|| StateError::NotAnArray(name.to_string()))
    }

    /// Add an item at the end of an array field.
    ///
    /// # Errors
    ///
    /// `StateError::TooManyItems` when `maxItems` is already reached.
    pub fn append_item(&mut self, name: &str, item: impl Into<Value>) -> Result<(), StateError> {
        let limits = self.limits(name)?;
        let items = self.items_mut(name)?;
        if let Some(max) = limits.max {
            if items.len() >= max {
                return Err(StateError::TooManyItems {
                    field: name.to_string(),
                    max,
                });
            }
        }
        items.push(item.into());
        self.touched.insert(name.to_string());
        Ok(())
    }

    /// Remove the item at `index`.
    ///
    /// # Errors
    ///
    /// `StateError::TooFewItems` when removal would go below `minItems`,
    /// `StateError::IndexOutOfBounds` for a bad index.
    pub fn remove_item(&mut self, name: &str, index: usize) -> Result<Value, StateError> {
        let limits = self.limits(name)?;
        let len = self.items(name)?.len();
        if index >= len {
            return Err(StateError::IndexOutOfBounds {
                field: name.to_string(),
                index,
                len,
            });
        }
        if let Some(min) = limits.min {
            if len <= min {
                return Err(StateError::TooFewItems {
                    field: name.to_string(),
                    min,
                });
            }
        }
        let removed = self.items_mut(name)?.remove(index);
        self.touched.insert(name.to_string());
        Ok(removed)
    }

    /// Move the item at `from` so that it ends up at `to`.
    ///
    /// # Errors
    ///
    /// `StateError::IndexOutOfBounds` if either index is out of range.
    pub fn move_item(&mut self, name: &str, from: usize, to: usize) -> Result<(), StateError> {
        let len = self.items(name)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(StateError::IndexOutOfBounds {
                    field: name.to_string(),
                    index,
                    len,
                });
            }
        }
        let items = self.items_mut(name)?;
        let item = items.remove(from);
        items.insert(to, item);
        self.touched.insert(name.to_string());
        Ok(())
    }
}
