//! Dialog lifecycle and the validate → submit → notify flow.
//!
//! [`FormDialog`] is synchronous: [`FormDialog::submit`] validates and, when
//! the form is valid, hands back a [`SubmitRequest`] for the caller to run
//! against a [`CarApi`]. The result goes back through
//! [`FormDialog::complete`], which applies the post-submit side effects only
//! if the dialog session that issued the request is still open.

use std::fmt;

use chrono::{Datelike, Utc};
use serde_json::Value;

use super::notify::{FormHost, Notifier, Severity, SubmitFailure};
use super::state::FormState;
use crate::api::{ApiError, CarApi};
use crate::model::{Car, CarRecord, Field, validate_for_year};

/// Whether the dialog creates a new car or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

impl DialogMode {
    /// Dialog title.
    pub fn title(&self) -> &'static str {
        match self {
            DialogMode::Create => "CREATE A NEW CAR",
            DialogMode::Edit => "EDIT CAR",
        }
    }

    /// Label of the submit button.
    pub fn submit_label(&self) -> &'static str {
        match self {
            DialogMode::Create => "Create",
            DialogMode::Edit => "Save",
        }
    }

    pub(crate) fn verb(&self) -> &'static str {
        match self {
            DialogMode::Create => "Create",
            DialogMode::Edit => "Update",
        }
    }
}

#[mutants::skip]
impl fmt::Display for DialogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DialogMode::Create => "create",
            DialogMode::Edit => "edit",
        })
    }
}

/// When form values are wiped after a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Reset values when local validation fails.
    pub reset_on_invalid: bool,
    /// Reset values after the API call succeeds.
    pub reset_on_success: bool,
    /// Reset values after the API call fails.
    pub reset_on_failure: bool,
    /// Close the dialog after the API call succeeds.
    pub close_on_success: bool,
}

impl Default for SubmitPolicy {
    /// Keeps the user's input whenever a submit does not go through.
    fn default() -> Self {
        Self {
            reset_on_invalid: false,
            reset_on_success: true,
            reset_on_failure: false,
            close_on_success: true,
        }
    }
}

impl SubmitPolicy {
    /// Resets on every outcome and never closes the dialog by itself.
    ///
    /// Values are wiped when the outcome is known, not when the request is
    /// sent, and a completion for a closed dialog is still stale.
    pub fn legacy() -> Self {
        Self {
            reset_on_invalid: true,
            reset_on_success: true,
            reset_on_failure: true,
            close_on_success: false,
        }
    }
}

/// The API call a valid submit asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOperation {
    Create(Car),
    Update { id: String, car: Car },
}

/// A validated submit waiting to be sent.
///
/// Tied to the dialog session that produced it; see [`FormDialog::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    session: u64,
    operation: SubmitOperation,
}

impl SubmitRequest {
    pub fn operation(&self) -> &SubmitOperation {
        &self.operation
    }

    pub fn mode(&self) -> DialogMode {
        match self.operation {
            SubmitOperation::Create(_) => DialogMode::Create,
            SubmitOperation::Update { .. } => DialogMode::Edit,
        }
    }

    /// Sends the request with exactly one API call.
    pub async fn execute<A: CarApi + ?Sized>(&self, api: &A) -> Result<CarRecord, ApiError> {
        match &self.operation {
            SubmitOperation::Create(car) => api.create(car).await,
            SubmitOperation::Update { id, car } => api.update(id, car).await,
        }
    }
}

/// Result of [`FormDialog::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    /// Dialog closed, or a request is already in flight.
    Ignored,
    /// Validation failed; the form's errors were replaced.
    Invalid,
    /// Validation passed; the caller must execute the request.
    Dispatch(SubmitRequest),
}

/// Result of [`FormDialog::complete`].
#[derive(Debug)]
pub enum Completion {
    /// The issuing session is gone; nothing was done.
    Stale,
    Succeeded(CarRecord),
    Failed(SubmitFailure),
}

#[derive(Debug, Clone)]
struct OpenDialog {
    mode: DialogMode,
    target: Option<CarRecord>,
}

/// The car create/edit dialog.
#[derive(Debug, Clone)]
pub struct FormDialog {
    form: FormState,
    open: Option<OpenDialog>,
    session: u64,
    in_flight: Option<u64>,
    policy: SubmitPolicy,
}

impl Default for FormDialog {
    fn default() -> Self {
        Self::new(SubmitPolicy::default())
    }
}

impl FormDialog {
    /// Creates a closed dialog with default values.
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            form: FormState::new(),
            open: None,
            session: 0,
            in_flight: None,
            policy,
        }
    }

    /// Opens the dialog for `target` (edit) or for a new car (create).
    ///
    /// Always re-seeds the values from the target and clears all errors.
    /// Any request still in flight from an earlier opening becomes stale.
    pub fn open(&mut self, target: Option<CarRecord>) {
        let mode = if target.is_some() {
            DialogMode::Edit
        } else {
            DialogMode::Create
        };
        self.form.retarget(target.as_ref());
        self.session += 1;
        self.in_flight = None;
        tracing::debug!(%mode, session = self.session, "car dialog opened");
        self.open = Some(OpenDialog { mode, target });
    }

    /// Closes the dialog. Errors are cleared; values are kept.
    pub fn close(&mut self) {
        if self.open.take().is_some() {
            tracing::debug!(session = self.session, "car dialog closed");
        }
        self.in_flight = None;
        self.form.clear_errors();
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Returns `true` while a dispatched request has not completed.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Mode of the open dialog.
    pub fn mode(&self) -> Option<DialogMode> {
        self.open.as_ref().map(|o| o.mode)
    }

    /// Record being edited, if the dialog is open in edit mode.
    pub fn target(&self) -> Option<&CarRecord> {
        self.open.as_ref().and_then(|o| o.target.as_ref())
    }

    /// Instance key: the target id, or `"new"` in create mode.
    pub fn key(&self) -> Option<&str> {
        self.open
            .as_ref()
            .map(|o| o.target.as_ref().map_or("new", |t| t.id.as_str()))
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Updates one field's value.
    pub fn edit(&mut self, field: Field, value: impl Into<Value>) {
        self.form.set(field, value);
    }

    /// Removes one field's value.
    pub fn clear_field(&mut self, field: Field) {
        self.form.unset(field);
    }

    /// Validates against the current UTC year and prepares the API call.
    pub fn submit(&mut self) -> SubmitStep {
        self.submit_for_year(Utc::now().year())
    }

    /// Validates against `current_year` and prepares the API call.
    pub fn submit_for_year(&mut self, current_year: i32) -> SubmitStep {
        let Some(open) = &self.open else {
            return SubmitStep::Ignored;
        };
        if self.in_flight.is_some() {
            tracing::debug!("submit ignored: request already in flight");
            return SubmitStep::Ignored;
        }

        self.form.clear_errors();
        match validate_for_year(self.form.values(), current_year) {
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields(), "car form invalid");
                self.form.replace_errors(errors);
                if self.policy.reset_on_invalid {
                    self.form.reset_values();
                }
                SubmitStep::Invalid
            }
            Ok(car) => {
                let operation = match &open.target {
                    Some(target) => SubmitOperation::Update {
                        id: target.id.clone(),
                        car,
                    },
                    None => SubmitOperation::Create(car),
                };
                self.in_flight = Some(self.session);
                SubmitStep::Dispatch(SubmitRequest {
                    session: self.session,
                    operation,
                })
            }
        }
    }

    /// Applies the outcome of an executed request.
    ///
    /// If the dialog was closed or re-opened after `request` was issued, the
    /// outcome is dropped with no side effects. Otherwise, on success the host
    /// refreshes and returns to page 1, then a toast is shown; on failure the
    /// error goes to [`Notifier::report_error`]. Values are reset according
    /// to the [`SubmitPolicy`].
    pub fn complete<H, N>(
        &mut self,
        request: &SubmitRequest,
        result: Result<CarRecord, ApiError>,
        host: &mut H,
        notifier: &mut N,
    ) -> Completion
    where
        H: FormHost + ?Sized,
        N: Notifier + ?Sized,
    {
        if self.open.is_none() || self.in_flight != Some(request.session) {
            tracing::debug!(
                session = request.session,
                "ignoring stale submit completion"
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        let mode = request.mode();
        match result {
            Ok(record) => {
                tracing::info!(id = %record.id, %mode, "car saved");
                host.refresh_data();
                host.set_page(1);
                match mode {
                    DialogMode::Edit => notifier.notify(Severity::Info, "Update Car success"),
                    DialogMode::Create => notifier.notify(Severity::Success, "Create Car Success"),
                }
                if self.policy.reset_on_success {
                    self.form.reset_values();
                }
                if self.policy.close_on_success {
                    self.close();
                }
                Completion::Succeeded(record)
            }
            Err(source) => {
                let failure = SubmitFailure { mode, source };
                tracing::error!(error = %failure, "car submit failed");
                notifier.report_error(&failure);
                if self.policy.reset_on_failure {
                    self.form.reset_values();
                }
                Completion::Failed(failure)
            }
        }
    }
}
