use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde_json::Value;
use thiserror::Error;

use super::car::{Car, CarDraft};
use super::field::Field;
use super::size::CarSize;
use super::transmission::TransmissionType;

/// Earliest accepted model year.
pub const MIN_YEAR: i32 = 1900;
/// Lowest accepted price.
pub const MIN_PRICE: i64 = 1000;

/// Largest integer a JSON number can carry without losing precision.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A single failed rule for one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("\"{0}\" is required")]
    Required(Field),
    #[error("\"{0}\" must be a string")]
    NotAString(Field),
    #[error("\"{0}\" is not allowed to be empty")]
    Empty(Field),
    #[error("\"{0}\" must be a number")]
    NotANumber(Field),
    #[error("\"{0}\" must be an integer")]
    NotAnInteger(Field),
    #[error("\"{0}\" must be a safe number")]
    Unsafe(Field),
    #[error("\"{field}\" must be greater than or equal to {min}")]
    TooSmall { field: Field, min: i64 },
    #[error("\"{field}\" must be less than or equal to {max}")]
    TooLarge { field: Field, max: i64 },
    #[error("\"{field}\" must be one of [{allowed}]")]
    NotAllowed { field: Field, allowed: String },
}

impl ValidationError {
    /// Returns the field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(f)
            | ValidationError::NotAString(f)
            | ValidationError::Empty(f)
            | ValidationError::NotANumber(f)
            | ValidationError::NotAnInteger(f)
            | ValidationError::Unsafe(f) => *f,
            ValidationError::TooSmall { field, .. }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::NotAllowed { field, .. } => *field,
        }
    }
}

/// Per-field validation failures, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(BTreeMap<Field, ValidationError>);

impl FieldErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error under its own field, replacing any previous one.
    pub fn insert(&mut self, error: ValidationError) {
        self.0.insert(error.field(), error);
    }

    /// Returns the error for a field, if any.
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.get(&field)
    }

    /// Returns the rendered message for a field, if it has an error.
    pub fn message(&self, field: Field) -> Option<String> {
        self.get(field).map(ToString::to_string)
    }

    /// Returns `true` if the field currently has an error.
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the failing fields in dialog order.
    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.0.iter().map(|(f, e)| (*f, e))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.values().map(ToString::to_string).collect();
        f.write_str(&messages.join(". "))
    }
}

impl std::error::Error for FieldErrors {}

/// Validates a draft against the current UTC calendar year.
pub fn validate(draft: &CarDraft) -> Result<Car, FieldErrors> {
    validate_for_year(draft, Utc::now().year())
}

/// Validates every field of a draft, collecting all failures in one pass.
///
/// On success the returned [`Car`] holds coerced values only; keys that are
/// not car fields are dropped.
pub fn validate_for_year(draft: &CarDraft, current_year: i32) -> Result<Car, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = keep(&mut errors, validate_text(draft, Field::Name));
    let model = keep(&mut errors, validate_text(draft, Field::Model));
    let year = keep(
        &mut errors,
        validate_integer(
            draft,
            Field::Year,
            i64::from(MIN_YEAR),
            Some(i64::from(current_year)),
        ),
    );
    let transmission_type = keep(
        &mut errors,
        validate_choice::<TransmissionType>(draft, Field::TransmissionType, TransmissionType::all()),
    );
    let price = keep(
        &mut errors,
        validate_integer(draft, Field::Price, MIN_PRICE, None),
    );
    let size = keep(
        &mut errors,
        validate_choice::<CarSize>(draft, Field::Size, CarSize::all()),
    );
    let style = keep(&mut errors, validate_text(draft, Field::Style));

    match (name, model, year, transmission_type, price, size, style) {
        (
            Some(name),
            Some(model),
            Some(year),
            Some(transmission_type),
            Some(price),
            Some(size),
            Some(style),
        ) if errors.is_empty() => match i32::try_from(year) {
            Ok(year) => Ok(Car {
                name,
                model,
                year,
                transmission_type,
                price,
                size,
                style,
            }),
            Err(_) => {
                errors.insert(ValidationError::TooLarge {
                    field: Field::Year,
                    max: i64::from(current_year),
                });
                Err(errors)
            }
        },
        _ => Err(errors),
    }
}

fn keep<T>(errors: &mut FieldErrors, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.insert(e);
            None
        }
    }
}

/// Required, non-empty string. Not trimmed.
fn validate_text(draft: &CarDraft, field: Field) -> Result<String, ValidationError> {
    match draft.get(field) {
        None => Err(ValidationError::Required(field)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::Empty(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

/// Required whole number in `[min, max]`; numeric strings are coerced.
fn validate_integer(
    draft: &CarDraft,
    field: Field,
    min: i64,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    let number = match draft.get(field) {
        None => return Err(ValidationError::Required(field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(_) => None,
    };
    let number = number
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::NotANumber(field))?;

    if number.abs() > MAX_SAFE_INTEGER {
        return Err(ValidationError::Unsafe(field));
    }

    // Rules run in the order integer, min, max and the last failure is the
    // one shown, so a range error outranks a fractional value.
    if number < min as f64 {
        return Err(ValidationError::TooSmall { field, min });
    }
    if let Some(max) = max
        && number > max as f64
    {
        return Err(ValidationError::TooLarge { field, max });
    }
    if number.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger(field));
    }
    Ok(number as i64)
}

/// Required exact match against a fixed set of literals.
fn validate_choice<T>(draft: &CarDraft, field: Field, all: &[T]) -> Result<T, ValidationError>
where
    T: FromStr + fmt::Display,
{
    let not_allowed = || ValidationError::NotAllowed {
        field,
        allowed: all
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    };
    // A value outside the set fails first; an empty or non-string value then
    // fails the string check too, and that later message is the one shown.
    match draft.get(field) {
        None => Err(ValidationError::Required(field)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::Empty(field)),
        Some(Value::String(s)) => s.parse::<T>().map_err(|_| not_allowed()),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}
