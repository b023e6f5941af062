//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;

use crate::app::App;
use crate::state::FormLoad;
use components::{render_error_dialog, render_load_error_dialog};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    match &app.state.form {
        FormLoad::Loading => forms::draw_loading(frame, main_area),
        FormLoad::Ready(form) => forms::draw_profile_form(frame, main_area, app, form),
        FormLoad::Failed(message) => {
            forms::draw_loading(frame, main_area);
            render_load_error_dialog(frame, message);
        }
    }

    layout::draw_status_bar(frame, status_area, app);

    if let Some(error) = &app.state.error_message {
        render_error_dialog(frame, error);
    }
}
