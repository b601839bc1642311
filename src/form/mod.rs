//! The car create/edit dialog, independent of any rendering.

mod dialog;
mod notify;
mod state;

pub use dialog::{
    Completion, DialogMode, FormDialog, SubmitOperation, SubmitPolicy, SubmitRequest, SubmitStep,
};
pub use notify::{FormHost, Notifier, Severity, SubmitFailure};
pub use state::FormState;
