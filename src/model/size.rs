use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Size class of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarSize {
    Compact,
    Midsize,
    Large,
}

static ALL_SIZES: &[CarSize] = &[CarSize::Compact, CarSize::Midsize, CarSize::Large];

impl CarSize {
    /// Returns the wire literal for this size.
    pub fn as_str(&self) -> &'static str {
        match self {
            CarSize::Compact => "Compact",
            CarSize::Midsize => "Midsize",
            CarSize::Large => "Large",
        }
    }

    /// Returns all sizes, smallest first.
    pub fn all() -> &'static [CarSize] {
        ALL_SIZES
    }
}

impl FromStr for CarSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|size| size.as_str() == s)
            .ok_or(())
    }
}

#[mutants::skip]
impl fmt::Display for CarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
