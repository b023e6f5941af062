//! Application state definitions

use super::forms::{FieldKey, FormController, FormValues, DATE_FORMAT};

/// Initialization state of the profile form
#[derive(Default)]
pub enum FormLoad {
    /// Seed record not fetched yet
    #[default]
    Loading,
    Ready(Box<FormController>),
    /// Seed fetch failed; the form stays unavailable until a retry succeeds
    Failed(String),
}

/// Buttons in the action row, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionButton {
    #[default]
    Submit,
    AddPhone,
    Reset,
}

impl ActionButton {
    pub const ALL: [ActionButton; 3] = [Self::Submit, Self::AddPhone, Self::Reset];

    pub fn next(&self) -> Self {
        match self {
            Self::Submit => Self::AddPhone,
            Self::AddPhone => Self::Reset,
            Self::Reset => Self::Submit,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Submit => Self::Reset,
            Self::AddPhone => Self::Submit,
            Self::Reset => Self::AddPhone,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Submit => "Submit",
            Self::AddPhone => "Add phone number",
            Self::Reset => "Reset",
        }
    }
}

/// What currently has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldKey),
    Actions,
}

/// Raw text of inputs that are coerced before reaching the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drafts {
    pub age: String,
    pub dob: String,
}

impl Drafts {
    pub fn from_values(values: &FormValues) -> Self {
        Self {
            age: values.age.map(|a| a.to_string()).unwrap_or_default(),
            dob: values
                .dob
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    /// Draft buffer backing `key`, if it has one
    pub fn for_key_mut(&mut self, key: FieldKey) -> Option<&mut String> {
        match key {
            FieldKey::Age => Some(&mut self.age),
            FieldKey::Dob => Some(&mut self.dob),
            _ => None,
        }
    }

    pub fn for_key(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::Age => Some(&self.age),
            FieldKey::Dob => Some(&self.dob),
            _ => None,
        }
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    pub form: FormLoad,
    /// Index into [`AppState::focus_order`]
    pub focus_index: usize,
    pub selected_button: ActionButton,
    pub drafts: Drafts,
    /// Transient status bar message
    pub status_message: Option<String>,
    /// Error shown in a dialog until dismissed
    pub error_message: Option<String>,
    /// Snapshot handed to the success handler by the last submission
    pub last_submitted: Option<FormValues>,
}

impl AppState {
    pub fn controller(&self) -> Option<&FormController> {
        match &self.form {
            FormLoad::Ready(form) => Some(form.as_ref()),
            _ => None,
        }
    }

    pub fn controller_mut(&mut self) -> Option<&mut FormController> {
        match &mut self.form {
            FormLoad::Ready(form) => Some(form.as_mut()),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.form, FormLoad::Ready(_))
    }

    /// Focus targets in tab order: every field, then the action row
    pub fn focus_order(&self) -> Vec<FocusTarget> {
        let mut order: Vec<FocusTarget> = self
            .controller()
            .map(|form| form.values().keys())
            .unwrap_or_default()
            .into_iter()
            .map(FocusTarget::Field)
            .collect();
        order.push(FocusTarget::Actions);
        order
    }

    pub fn focused(&self) -> FocusTarget {
        let order = self.focus_order();
        order
            .get(self.focus_index)
            .copied()
            .unwrap_or(FocusTarget::Actions)
    }

    pub fn focused_field(&self) -> Option<FieldKey> {
        match self.focused() {
            FocusTarget::Field(key) => Some(key),
            FocusTarget::Actions => None,
        }
    }

    pub fn next_focus(&mut self) {
        let count = self.focus_order().len();
        self.focus_index = (self.focus_index + 1) % count;
    }

    pub fn prev_focus(&mut self) {
        let count = self.focus_order().len();
        if self.focus_index == 0 {
            self.focus_index = count - 1;
        } else {
            self.focus_index -= 1;
        }
    }

    /// Move focus to a specific target if it exists
    pub fn focus(&mut self, target: FocusTarget) {
        if let Some(index) = self.focus_order().iter().position(|t| *t == target) {
            self.focus_index = index;
        }
    }

    /// Keep focus in range after the focus order shrank
    pub fn clamp_focus(&mut self) {
        let count = self.focus_order().len();
        self.focus_index = self.focus_index.min(count - 1);
    }

    /// Refresh draft buffers from the form values
    pub fn sync_drafts(&mut self) {
        if let Some(values) = self.controller().map(|form| form.values().clone()) {
            self.drafts = Drafts::from_values(&values);
        }
    }
}
