use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::Field;
use super::size::CarSize;
use super::transmission::TransmissionType;

/// A validated car record, ready to send to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub name: String,
    pub model: String,
    pub year: i32,
    pub transmission_type: TransmissionType,
    pub price: i64,
    pub size: CarSize,
    pub style: String,
}

/// A car as stored by the server: its opaque id plus whatever fields the
/// server returned.
///
/// Fields are kept raw so that an edit dialog can be seeded from records the
/// local validator would reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CarRecord {
    /// Builds a record from an id and a validated car.
    pub fn from_car(id: impl Into<String>, car: &Car) -> Self {
        let fields = match serde_json::to_value(car) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Raw, unvalidated form values keyed by JSON field name.
///
/// Any key may be absent or hold a value of the wrong type; keys that are not
/// car fields (e.g. `_id` or `__v` copied from a server record) are carried
/// along and stripped during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarDraft(Map<String, Value>);

impl Default for CarDraft {
    /// Empty strings for text and enum fields, price `0`, year absent.
    fn default() -> Self {
        let mut map = Map::new();
        for field in [
            Field::Name,
            Field::Model,
            Field::TransmissionType,
            Field::Size,
            Field::Style,
        ] {
            map.insert(field.key().to_string(), Value::String(String::new()));
        }
        map.insert(Field::Price.key().to_string(), Value::from(0));
        Self(map)
    }
}

impl CarDraft {
    /// Creates a draft holding the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every value of a server record, including its id and any
    /// unknown keys.
    pub fn from_record(record: &CarRecord) -> Self {
        let mut map = record.fields.clone();
        map.insert("_id".to_string(), Value::String(record.id.clone()));
        Self(map)
    }

    /// Returns the raw value of a field, if present.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0.get(field.key())
    }

    /// Replaces the value of exactly one field.
    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        self.0.insert(field.key().to_string(), value.into());
    }

    /// Removes a field entirely.
    pub fn remove(&mut self, field: Field) {
        self.0.remove(field.key());
    }

    /// Inserts a value under an arbitrary key.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Returns the display text of a field: strings as-is, numbers formatted,
    /// anything else (or absent) as an empty string.
    pub fn text(&self, field: Field) -> String {
        match self.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Returns the year as an integer, if it holds a whole number.
    pub fn year(&self) -> Option<i32> {
        match self.get(Field::Year)? {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the underlying key/value map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CarDraft {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<&Car> for CarDraft {
    fn from(car: &Car) -> Self {
        match serde_json::to_value(car) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }
}
