//! Collaborators the dialog reports to after a submit completes.

use std::fmt;

use super::dialog::DialogMode;
use crate::api::ApiError;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[mutants::skip]
impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        })
    }
}

/// A create or update call that did not succeed.
#[derive(Debug, thiserror::Error)]
#[error("{verb} Car failed: {source}", verb = .mode.verb())]
pub struct SubmitFailure {
    pub mode: DialogMode,
    #[source]
    pub source: ApiError,
}

/// Fire-and-forget user notifications.
///
/// Failures arrive on [`report_error`](Self::report_error), separate from the
/// toasts sent through [`notify`](Self::notify).
pub trait Notifier {
    fn notify(&mut self, severity: Severity, message: &str);

    /// Surfaces a failed submit. Defaults to an error toast.
    fn report_error(&mut self, failure: &SubmitFailure) {
        self.notify(Severity::Error, &failure.to_string());
    }
}

/// The screen that owns the dialog and the list it edits.
pub trait FormHost {
    /// Re-fetches the host's data after a successful save.
    fn refresh_data(&mut self);

    /// Moves the host's pagination to `page` (1-based).
    fn set_page(&mut self, page: u32);
}
