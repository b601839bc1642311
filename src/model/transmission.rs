use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gearbox type of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionType {
    Manual,
    Automatic,
    AutomatedManual,
    DirectDrive,
    Unknown,
}

static ALL_TRANSMISSIONS: &[TransmissionType] = &[
    TransmissionType::Manual,
    TransmissionType::Automatic,
    TransmissionType::AutomatedManual,
    TransmissionType::DirectDrive,
    TransmissionType::Unknown,
];

impl TransmissionType {
    /// Returns the wire literal for this transmission type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransmissionType::Manual => "MANUAL",
            TransmissionType::Automatic => "AUTOMATIC",
            TransmissionType::AutomatedManual => "AUTOMATED_MANUAL",
            TransmissionType::DirectDrive => "DIRECT_DRIVE",
            TransmissionType::Unknown => "UNKNOWN",
        }
    }

    /// Returns all transmission types in display order.
    pub fn all() -> &'static [TransmissionType] {
        ALL_TRANSMISSIONS
    }
}

impl FromStr for TransmissionType {
    type Err = ();

    /// Parses the exact wire literal; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

#[mutants::skip]
impl fmt::Display for TransmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
