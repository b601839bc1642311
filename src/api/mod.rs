//! Remote car collection: the [`CarApi`] seam and its HTTP implementation.
//!
//! The server exposes a single resource collection at `{base}/car`; records
//! are created with `POST` and updated with `PUT {base}/car/{id}`.

mod client;
mod error;

pub use client::{CarApi, HttpCarApi};
pub use error::ApiError;
