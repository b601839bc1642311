//! Reusable TUI widgets.

pub mod form;
pub mod toast;
pub mod year_picker;

pub use form::{FieldKind, Form, FormRow, draw_form};
pub use toast::{Toast, ToastBar, draw_toast};
pub use year_picker::YearPicker;
