//! Profile form screen

use super::field_renderer::{field_line, gender_line, FieldLine};
use crate::app::App;
use crate::platform::{APPEND_SHORTCUT, REMOVE_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::forms::{FieldKey, FormController};
use crate::state::{ActionButton, FocusTarget};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Draw the placeholder shown while the seed record is fetched
pub fn draw_loading(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Profile ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let text = Paragraph::new("Loading profile...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(text, area);
}

/// Draw the profile form with its action row
pub fn draw_profile_form(frame: &mut Frame, area: Rect, app: &App, form: &FormController) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),                // Fields
            Constraint::Length(BUTTON_HEIGHT), // Actions
            Constraint::Length(1),             // Help
        ])
        .split(area);

    draw_fields(frame, chunks[0], app, form);
    draw_actions(frame, chunks[1], app, form);
    draw_help_text(frame, chunks[2]);
}

fn draw_fields(frame: &mut Frame, area: Rect, app: &App, form: &FormController) {
    let focused = app.state.focused();
    let keys = form.values().keys();

    let items: Vec<ListItem> = keys
        .iter()
        .map(|key| ListItem::new(render_field(app, form, *key, focused)))
        .collect();

    let title = if form.is_dirty() {
        format!(" Profile of {} (modified) ", form.defaults().email)
    } else {
        format!(" Profile of {} ", form.defaults().email)
    };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    // Keep the focused field in view; the action row is below the list
    let selected = match focused {
        FocusTarget::Field(key) => keys.iter().position(|k| *k == key),
        FocusTarget::Actions => keys.len().checked_sub(1),
    };
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_field(
    app: &App,
    form: &FormController,
    key: FieldKey,
    focused: FocusTarget,
) -> Line<'static> {
    let is_active = focused == FocusTarget::Field(key);
    let error = form.error(key);

    if key == FieldKey::Gender {
        return gender_line(form.values().gender, error, is_active);
    }

    let value = match app.state.drafts.for_key(key) {
        Some(draft) => draft.to_string(),
        None => form
            .value(key)
            .map(|v| v.display_value())
            .unwrap_or_default(),
    };

    let note = match key {
        FieldKey::Email if form.is_checking_email() => Some("checking..."),
        FieldKey::Dob if is_active => Some("YYYY-MM-DD"),
        FieldKey::Phone(index) if index > 0 && is_active => Some(REMOVE_SHORTCUT),
        _ if form.is_touched(key) && error.is_none() => Some("✓"),
        _ => None,
    };

    // Dirty fields are starred
    let label = if form.dirty_fields().contains(&key) {
        format!("{}*", key.label())
    } else {
        key.label()
    };

    field_line(FieldLine {
        label,
        value,
        error,
        is_active,
        note,
    })
}

fn draw_actions(frame: &mut Frame, area: Rect, app: &App, form: &FormController) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(22),
            Constraint::Length(11),
            Constraint::Min(0),
        ])
        .split(area);

    let on_actions = app.state.focused() == FocusTarget::Actions;
    for (idx, button) in ActionButton::ALL.iter().enumerate() {
        let is_selected = on_actions && app.state.selected_button == *button;
        let is_enabled = match button {
            ActionButton::Submit => form.can_submit(),
            ActionButton::AddPhone | ActionButton::Reset => true,
        };
        render_button(frame, chunks[idx], button.label(), is_selected, is_enabled);
    }

    if form.is_submitting() {
        let busy = Paragraph::new("Submitting...").style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(busy, inner_row(chunks[3]));
    }
}

/// Middle row of a button-height area
fn inner_row(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + area.height / 2,
        width: area.width.saturating_sub(1),
        height: 1,
    }
}

fn draw_help_text(frame: &mut Frame, area: Rect) {
    let help = format!(
        "Tab: next | Shift+Tab: prev | {SUBMIT_SHORTCUT}: submit | {APPEND_SHORTCUT}: add phone \
         | {REMOVE_SHORTCUT}: remove phone | Space: gender | Esc: quit"
    );
    let paragraph = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}
