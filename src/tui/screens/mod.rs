//! TUI screen implementations.

pub mod car_form;

pub use car_form::{CarFormScreen, draw_car_form};
