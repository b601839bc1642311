//! Toast bar: one-line display of the most recent notification.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::form::{Notifier, Severity, SubmitFailure};

/// A notification waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
}

/// Keeps the latest toast for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastBar {
    current: Option<Toast>,
}

impl ToastBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the toast currently shown, if any.
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

impl Notifier for ToastBar {
    fn notify(&mut self, severity: Severity, message: &str) {
        self.current = Some(Toast {
            severity,
            message: message.to_string(),
        });
    }

    fn report_error(&mut self, failure: &SubmitFailure) {
        self.notify(Severity::Error, &format!("{failure}. Your input was kept."));
    }
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::default().fg(Color::Cyan),
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

/// Renders the current toast, or nothing.
#[mutants::skip]
pub fn draw_toast(bar: &ToastBar, frame: &mut Frame, area: Rect) {
    let Some(toast) = bar.current() else {
        return;
    };
    let style = severity_style(toast.severity);
    let line = Line::from(vec![
        Span::styled(format!("[{}] ", toast.severity), style),
        Span::styled(toast.message.clone(), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
