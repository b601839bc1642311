//! Car form widget: field rows, focus management and rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::form::FormState;
use crate::model::Field;

/// How a row is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Digits only.
    Number,
    /// One of a fixed list of literals, cycled with Left/Right.
    Select(&'static [&'static str]),
    /// A year stepped with the arrow keys.
    Year,
}

/// A single row within a [`Form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRow {
    pub field: Field,
    pub kind: FieldKind,
}

impl FormRow {
    pub fn new(field: Field, kind: FieldKind) -> Self {
        Self { field, kind }
    }
}

/// Row layout and focus for a form whose values live in a [`FormState`].
#[derive(Debug, Clone)]
pub struct Form {
    rows: Vec<FormRow>,
    focus: usize,
}

impl Form {
    /// Creates a form with the given rows. Focus starts on the first row.
    pub fn new(rows: Vec<FormRow>) -> Self {
        Self { rows, focus: 0 }
    }

    /// Returns the index of the currently focused row.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Returns the focused row, if the form has any rows.
    pub fn focused(&self) -> Option<FormRow> {
        self.rows.get(self.focus).copied()
    }

    /// Moves focus to the next row, wrapping around.
    pub fn focus_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.focus = (self.focus + 1) % self.rows.len();
    }

    /// Moves focus to the previous row, wrapping around.
    pub fn focus_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.focus = (self.focus + self.rows.len() - 1) % self.rows.len();
    }

    /// Moves focus to the row editing `field`, if present.
    pub fn focus_field(&mut self, field: Field) {
        if let Some(index) = self.rows.iter().position(|r| r.field == field) {
            self.focus = index;
        }
    }

    /// Moves focus back to the first row.
    pub fn reset_focus(&mut self) {
        self.focus = 0;
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }
}

/// Text shown for a row's value.
fn display_value(row: &FormRow, state: &FormState) -> String {
    let text = state.text(row.field);
    match row.kind {
        FieldKind::Select(_) if text.is_empty() => "\u{2039} choose \u{203a}".to_string(),
        FieldKind::Select(_) => format!("\u{2039} {text} \u{203a}"),
        FieldKind::Year if text.is_empty() => "\u{2039} ---- \u{203a}".to_string(),
        FieldKind::Year => format!("\u{2039} {text} \u{203a}"),
        FieldKind::Text | FieldKind::Number => text,
    }
}

/// Renders a form within the given area.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
pub fn draw_form(form: &Form, state: &FormState, frame: &mut Frame, area: Rect) {
    let row_height = 3_u16;
    let constraints: Vec<Constraint> = form
        .rows
        .iter()
        .map(|_| Constraint::Length(row_height))
        .collect();

    let areas = Layout::vertical(constraints).split(area);

    for (i, row) in form.rows.iter().enumerate() {
        let is_focused = i == form.focus;
        let error = state.error(row.field);

        let border_color = if error.is_some() {
            Color::Red
        } else if is_focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let block = Block::default()
            .title(format!("{} *", row.field.label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        let mut spans = vec![Span::raw(display_value(row, state))];
        if is_focused && matches!(row.kind, FieldKind::Text | FieldKind::Number) {
            spans.push(Span::styled(
                "\u{2588}",
                Style::default().add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(block);
        frame.render_widget(paragraph, areas[i]);

        // Error text sits on the bottom border of the row.
        if let Some(err) = error {
            let error_line = Paragraph::new(Span::styled(err, Style::default().fg(Color::Red)));
            let err_area = Rect {
                x: areas[i].x + 2,
                y: areas[i].y + row_height.saturating_sub(1),
                width: areas[i].width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(error_line, err_area);
        }
    }
}
