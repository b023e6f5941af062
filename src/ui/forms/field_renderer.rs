//! Field rendering utilities for forms

use crate::state::forms::Gender;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Width the field labels are padded to
const LABEL_WIDTH: usize = 16;

/// How a single field line should look
pub struct FieldLine<'a> {
    pub label: String,
    pub value: String,
    pub error: Option<&'a str>,
    pub is_active: bool,
    /// Dimmed note after the value (pending lookups, shortcuts)
    pub note: Option<&'a str>,
}

/// Build the line for a text input
pub fn field_line(field: FieldLine) -> Line<'static> {
    let label_style = if field.is_active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![Span::styled(
        format!("{:<LABEL_WIDTH$}", field.label),
        label_style,
    )];

    if field.value.is_empty() && !field.is_active {
        spans.push(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(field.value));
    }
    if field.is_active {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }

    push_trailer(&mut spans, field.note, field.error);
    Line::from(spans)
}

/// Build the line for the gender radio group
pub fn gender_line(
    selected: Option<Gender>,
    error: Option<&str>,
    is_active: bool,
) -> Line<'static> {
    let label_style = if is_active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![Span::styled(
        format!("{:<LABEL_WIDTH$}", "Gender"),
        label_style,
    )];
    for gender in [Gender::Male, Gender::Female] {
        let marker = if selected == Some(gender) { "(•)" } else { "( )" };
        let style = if selected == Some(gender) && is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{marker} {}  ", gender.label()), style));
    }

    push_trailer(&mut spans, None, error);
    Line::from(spans)
}

fn push_trailer(spans: &mut Vec<Span<'static>>, note: Option<&str>, error: Option<&str>) {
    if let Some(note) = note {
        spans.push(Span::styled(
            format!("  {note}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(error) = error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_inactive_empty_field_shows_placeholder() {
        let line = field_line(FieldLine {
            label: "Full Name".to_string(),
            value: String::new(),
            error: Some("FullName is required"),
            is_active: false,
            note: None,
        });
        let rendered = text(&line);
        assert!(rendered.starts_with("Full Name       (empty)"));
        assert!(rendered.ends_with("FullName is required"));
    }

    #[test]
    fn test_active_field_shows_cursor_and_note() {
        let line = field_line(FieldLine {
            label: "Email".to_string(),
            value: "bruce@wayne.com".to_string(),
            error: None,
            is_active: true,
            note: Some("checking..."),
        });
        assert_eq!(
            text(&line),
            format!("{:<16}bruce@wayne.com▌  checking...", "Email")
        );
    }

    #[test]
    fn test_gender_line_marks_selection() {
        let line = gender_line(Some(Gender::Female), None, false);
        let rendered = text(&line);
        assert!(rendered.contains("( ) Male"));
        assert!(rendered.contains("(•) Female"));
    }
}
