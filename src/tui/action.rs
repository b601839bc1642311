//! Actions returned by screen event handlers.

use crossterm::event::KeyEvent;

use crate::form::SubmitRequest;

/// An action that a screen handler returns to the [`App`](super::App).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No state change needed.
    None,
    /// Send a validated request to the API in the background.
    Dispatch(SubmitRequest),
    /// The dialog was dismissed.
    Cancel,
}

/// Common behavior for screen state types.
pub trait ScreenState {
    /// Process a key event and return an [`Action`] for the `App` to apply.
    fn handle_key(&mut self, key: KeyEvent) -> Action;
}
