//! Platform-specific configuration

use crossterm::event::{KeyEvent, KeyModifiers};

/// Platform-appropriate modifier for form shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const ACTION_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const ACTION_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Submit shortcut display for help text
#[cfg(target_os = "macos")]
pub const SUBMIT_SHORTCUT: &str = "Cmd+S";

#[cfg(not(target_os = "macos"))]
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Add phone shortcut display
#[cfg(target_os = "macos")]
pub const APPEND_SHORTCUT: &str = "Cmd+N";

#[cfg(not(target_os = "macos"))]
pub const APPEND_SHORTCUT: &str = "Ctrl+N";

/// Remove phone shortcut display
#[cfg(target_os = "macos")]
pub const REMOVE_SHORTCUT: &str = "Cmd+D";

#[cfg(not(target_os = "macos"))]
pub const REMOVE_SHORTCUT: &str = "Ctrl+D";

/// Whether `key` carries the action modifier. Ctrl is accepted everywhere
/// since many terminals never report Cmd.
pub fn has_action_modifier(key: &KeyEvent) -> bool {
    key.modifiers.contains(ACTION_MODIFIER) || key.modifiers.contains(KeyModifiers::CONTROL)
}
