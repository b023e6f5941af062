//! Layout components (content area, status bar)

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into content and a one-line status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    match app.state.controller() {
        Some(form) => {
            let validity = if form.is_valid() {
                Span::styled(" ● valid ", Style::default().fg(Color::Green))
            } else {
                Span::styled(" ○ invalid ", Style::default().fg(Color::Red))
            };
            spans.push(validity);
            spans.push(Span::raw(if form.is_dirty() { "| dirty " } else { "| pristine " }));
            spans.push(Span::raw(format!(
                "| touched: {} | errors: {} | submits: {} | {} ",
                form.touched_fields().len(),
                form.errors().len(),
                form.submit_count(),
                form.phase().label()
            )));
            if form.is_submitted() {
                spans.push(Span::raw("| submitted "));
            }
            if form.is_checking_email() {
                spans.push(Span::styled(
                    "| checking email ",
                    Style::default().fg(Color::Yellow),
                ));
            }
        }
        None => spans.push(Span::styled(
            " ○ not loaded ",
            Style::default().fg(Color::Gray),
        )),
    }

    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    // Quit hint on the right
    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(quit_hint.len() as u16),
        y: area.y,
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}
