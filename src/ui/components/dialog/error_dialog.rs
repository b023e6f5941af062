//! Error dialog components

use super::base::{key_hint, render_dialog, DialogConfig};
use ratatui::{style::Color, Frame};

/// Render an error dialog overlay centered on the screen
pub fn render_error_dialog(frame: &mut Frame, error_message: &str) {
    render_dialog(
        frame,
        DialogConfig {
            title: "Error",
            accent: Color::Red,
            message: error_message,
            hint: key_hint(&[
                ("Press ", false),
                ("Enter", true),
                (" or ", false),
                ("Esc", true),
                (" to dismiss", false),
            ]),
            max_width: 60,
        },
    );
}

/// Render the dialog shown when the form could not be initialized
pub fn render_load_error_dialog(frame: &mut Frame, error_message: &str) {
    let message = format!("Could not load the profile form.\n\n{error_message}");
    render_dialog(
        frame,
        DialogConfig {
            title: "Initialization failed",
            accent: Color::Red,
            message: &message,
            hint: key_hint(&[
                ("Press ", false),
                ("r", true),
                (" to retry or ", false),
                ("Esc", true),
                (" to quit", false),
            ]),
            max_width: 70,
        },
    );
}
