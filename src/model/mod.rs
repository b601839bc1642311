mod car;
mod field;
mod size;
mod transmission;
mod validation;

pub use car::{Car, CarDraft, CarRecord};
pub use field::Field;
pub use size::CarSize;
pub use transmission::TransmissionType;
pub use validation::{
    FieldErrors, MIN_PRICE, MIN_YEAR, ValidationError, validate, validate_for_year,
};
