use std::fmt;

/// The editable fields of a car record, in dialog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Model,
    TransmissionType,
    Size,
    Style,
    Year,
    Price,
}

static ALL_FIELDS: &[Field] = &[
    Field::Name,
    Field::Model,
    Field::TransmissionType,
    Field::Size,
    Field::Style,
    Field::Year,
    Field::Price,
];

impl Field {
    /// Returns every field in dialog order.
    pub fn all() -> &'static [Field] {
        ALL_FIELDS
    }

    /// Returns the JSON key used on the wire and in the draft map.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Model => "model",
            Field::TransmissionType => "transmissionType",
            Field::Size => "size",
            Field::Style => "style",
            Field::Year => "year",
            Field::Price => "price",
        }
    }

    /// Human-readable label for form rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Model => "Model",
            Field::TransmissionType => "Transmission Type",
            Field::Size => "Size",
            Field::Style => "Style",
            Field::Year => "Year",
            Field::Price => "Price",
        }
    }

    /// Looks up a field by its JSON key.
    pub fn from_key(key: &str) -> Option<Field> {
        Self::all().iter().copied().find(|f| f.key() == key)
    }
}

#[mutants::skip]
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_wire_names() {
        let keys: Vec<&str> = Field::all().iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "model",
                "transmissionType",
                "size",
                "style",
                "year",
                "price"
            ]
        );
    }

    #[test]
    fn from_key_round_trips() {
        for field in Field::all() {
            assert_eq!(Field::from_key(field.key()), Some(*field));
        }
    }

    #[test]
    fn from_key_unknown_is_none() {
        assert_eq!(Field::from_key("_id"), None);
        assert_eq!(Field::from_key("transmission_type"), None);
    }
}
