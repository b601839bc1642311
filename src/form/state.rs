//! Form values and field errors for the car dialog.

use serde_json::Value;

use crate::model::{CarDraft, CarRecord, Field, FieldErrors};

/// Current field values plus current field errors.
///
/// The two halves change independently: editing a value never touches the
/// errors, and replacing the errors never touches the values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: CarDraft,
    errors: FieldErrors,
}

impl FormState {
    /// Creates a form holding the default values and no errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a form seeded from `target`, or from defaults when `None`.
    pub fn seeded(target: Option<&CarRecord>) -> Self {
        Self {
            values: target.map(CarDraft::from_record).unwrap_or_default(),
            errors: FieldErrors::new(),
        }
    }

    /// Re-seeds values from a new target and clears all errors.
    pub fn retarget(&mut self, target: Option<&CarRecord>) {
        *self = Self::seeded(target);
    }

    /// Sets exactly one field's value.
    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        self.values.set(field, value);
    }

    /// Removes a field's value entirely.
    pub fn unset(&mut self, field: Field) {
        self.values.remove(field);
    }

    /// Returns the raw values.
    pub fn values(&self) -> &CarDraft {
        &self.values
    }

    /// Returns a field's value as display text.
    pub fn text(&self, field: Field) -> String {
        self.values.text(field)
    }

    /// Returns the current field errors.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Returns a field's error message, if it has one.
    pub fn error(&self, field: Field) -> Option<String> {
        self.errors.message(field)
    }

    /// Replaces the error map in full; previous errors are discarded.
    pub fn replace_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Restores default values. Errors are left alone.
    pub fn reset_values(&mut self) {
        self.values = CarDraft::default();
    }
}
