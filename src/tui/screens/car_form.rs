//! Car dialog screen: modal form for creating or editing a car.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::api::ApiError;
use crate::form::{
    Completion, DialogMode, FormDialog, FormHost, Notifier, SubmitPolicy, SubmitRequest,
    SubmitStep,
};
use crate::model::{CarRecord, Field};
use crate::tui::action::{Action, ScreenState};
use crate::tui::widgets::form::{FieldKind, Form, FormRow, draw_form};
use crate::tui::widgets::year_picker::YearPicker;

static TRANSMISSIONS: &[&str] = &[
    "MANUAL",
    "AUTOMATIC",
    "AUTOMATED_MANUAL",
    "DIRECT_DRIVE",
    "UNKNOWN",
];

static SIZES: &[&str] = &["Compact", "Midsize", "Large"];

/// State for the car dialog: the dialog itself plus focus and the year picker.
#[derive(Debug, Clone)]
pub struct CarFormScreen {
    dialog: FormDialog,
    form: Form,
    picker: YearPicker,
}

impl CarFormScreen {
    /// Creates a closed dialog screen.
    pub fn new(policy: SubmitPolicy) -> Self {
        Self::with_picker(policy, YearPicker::default())
    }

    /// Creates a closed dialog screen using the given year picker.
    pub fn with_picker(policy: SubmitPolicy, picker: YearPicker) -> Self {
        Self {
            dialog: FormDialog::new(policy),
            form: Form::new(vec![
                FormRow::new(Field::Name, FieldKind::Text),
                FormRow::new(Field::Model, FieldKind::Text),
                FormRow::new(Field::TransmissionType, FieldKind::Select(TRANSMISSIONS)),
                FormRow::new(Field::Size, FieldKind::Select(SIZES)),
                FormRow::new(Field::Style, FieldKind::Text),
                FormRow::new(Field::Year, FieldKind::Year),
                FormRow::new(Field::Price, FieldKind::Number),
            ]),
            picker,
        }
    }

    /// Opens the dialog for `target`, or for a new car when `None`.
    pub fn open(&mut self, target: Option<CarRecord>) {
        self.dialog.open(target);
        self.form.reset_focus();
    }

    /// Dismisses the dialog.
    pub fn close(&mut self) {
        self.dialog.close();
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn dialog(&self) -> &FormDialog {
        &self.dialog
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Hands an API result back to the dialog.
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
        let completion = self.dialog.complete(request, result, host, notifier);
        if matches!(completion, Completion::Succeeded(_)) {
            self.form.reset_focus();
        }
        completion
    }

    fn focused(&self) -> Option<FormRow> {
        self.form.focused()
    }

    /// Inserts a printable character into the focused text or number row.
    fn handle_char(&mut self, ch: char) {
        let Some(row) = self.focused() else {
            return;
        };
        let mut text = self.dialog.form().text(row.field);
        match row.kind {
            FieldKind::Text => text.push(ch),
            FieldKind::Number if ch.is_ascii_digit() => {
                if text == "0" {
                    text.clear();
                }
                text.push(ch);
            }
            FieldKind::Number | FieldKind::Select(_) | FieldKind::Year => return,
        }
        self.dialog.edit(row.field, text);
    }

    /// Deletes the last character, or clears a select/year row.
    fn handle_backspace(&mut self) {
        let Some(row) = self.focused() else {
            return;
        };
        match row.kind {
            FieldKind::Text | FieldKind::Number => {
                let mut text = self.dialog.form().text(row.field);
                text.pop();
                self.dialog.edit(row.field, text);
            }
            FieldKind::Select(_) => self.dialog.edit(row.field, ""),
            FieldKind::Year => self.dialog.clear_field(row.field),
        }
    }

    /// Left/Right: cycles a select row or steps the year by one.
    fn handle_horizontal(&mut self, forward: bool) {
        let Some(row) = self.focused() else {
            return;
        };
        match row.kind {
            FieldKind::Select(options) => {
                let current = self.dialog.form().text(row.field);
                if let Some(next) = cycle(options, &current, forward) {
                    self.dialog.edit(row.field, next);
                }
            }
            FieldKind::Year => self.step_year(if forward { 1 } else { -1 }),
            FieldKind::Text | FieldKind::Number => {}
        }
    }

    fn step_year(&mut self, delta: i32) {
        let current = self.dialog.form().values().year();
        let year = self.picker.step(current, delta);
        self.dialog.edit(Field::Year, year);
    }

    /// Validates and, if valid, asks the app to send the request.
    fn submit(&mut self) -> Action {
        match self.dialog.submit() {
            SubmitStep::Dispatch(request) => Action::Dispatch(request),
            SubmitStep::Invalid => {
                if let Some(first) = self.dialog.form().errors().fields().first() {
                    self.form.focus_field(*first);
                }
                Action::None
            }
            SubmitStep::Ignored => Action::None,
        }
    }
}

impl ScreenState for CarFormScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if !self.dialog.is_open() {
            return Action::None;
        }
        match key.code {
            KeyCode::Tab => {
                self.form.focus_next();
                Action::None
            }
            KeyCode::BackTab => {
                self.form.focus_prev();
                Action::None
            }
            KeyCode::Char(ch) => {
                self.handle_char(ch);
                Action::None
            }
            KeyCode::Backspace => {
                self.handle_backspace();
                Action::None
            }
            KeyCode::Left => {
                self.handle_horizontal(false);
                Action::None
            }
            KeyCode::Right => {
                self.handle_horizontal(true);
                Action::None
            }
            KeyCode::Up if self.focused().is_some_and(|r| r.kind == FieldKind::Year) => {
                self.step_year(10);
                Action::None
            }
            KeyCode::Down if self.focused().is_some_and(|r| r.kind == FieldKind::Year) => {
                self.step_year(-10);
                Action::None
            }
            KeyCode::Esc => {
                self.dialog.close();
                Action::Cancel
            }
            KeyCode::Enter => self.submit(),
            _ => Action::None,
        }
    }
}

/// Next or previous option; a value not in the list starts at either end.
fn cycle<'a>(options: &[&'a str], current: &str, forward: bool) -> Option<&'a str> {
    let len = options.len();
    if len == 0 {
        return None;
    }
    let next = match options.iter().position(|o| *o == current) {
        Some(pos) if forward => (pos + 1) % len,
        Some(pos) => (pos + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    options.get(next).copied()
}

/// Renders the dialog centred over `area`. Draws nothing while closed.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_car_form(screen: &CarFormScreen, frame: &mut Frame, area: Rect) {
    let Some(mode) = screen.dialog().mode() else {
        return;
    };

    let [popup] = Layout::horizontal([Constraint::Max(64)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    let [popup] = Layout::vertical([Constraint::Max(26)])
        .flex(ratatui::layout::Flex::Center)
        .areas(popup);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {} ", mode.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [form_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(21),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    draw_form(screen.form(), screen.dialog().form(), frame, form_area);

    if screen.dialog().is_submitting() {
        let saving = Paragraph::new(Span::styled(
            "Saving\u{2026}",
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(saving, status_area);
    }

    let footer = Paragraph::new(Line::from(footer_text(mode)))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, footer_area);
}

fn footer_text(mode: DialogMode) -> String {
    format!(
        "Tab: next  \u{2190}/\u{2192}: choose  \u{2191}/\u{2193}: \u{b1}10y  Enter: {}  Esc: cancel",
        mode.submit_label().to_lowercase()
    )
}
