//! Application state and core logic

use crate::directory::{email_taken, DirectoryError, UserDirectory};
use crate::platform::has_action_modifier;
use crate::state::forms::{
    log_events, EmailCheck, FieldKey, FieldValue, FormController, FormSettings, SetValueOptions,
    SubmitOutcome,
};
use crate::state::{ActionButton, AppState, FocusTarget, FormLoad};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome of a background email lookup
type EmailCheckResult = (EmailCheck, Result<bool, DirectoryError>);

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// User directory used for seeding and email checks
    directory: Arc<dyn UserDirectory>,
    settings: FormSettings,
    /// Whether the app should quit
    quit: bool,
    checks_tx: mpsc::UnboundedSender<EmailCheckResult>,
    checks_rx: mpsc::UnboundedReceiver<EmailCheckResult>,
}

impl App {
    /// Create a new App instance; the form starts out loading
    pub fn new(directory: Arc<dyn UserDirectory>, settings: FormSettings) -> Self {
        let (checks_tx, checks_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::default(),
            directory,
            settings,
            quit: false,
            checks_tx,
            checks_rx,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Fetch the seed record and make the form ready.
    ///
    /// On failure the form stays unavailable; the user may retry.
    pub async fn load_form(&mut self) {
        self.state.form = FormLoad::Loading;
        match FormController::load(self.directory.as_ref(), &self.settings).await {
            Ok(form) => {
                tokio::spawn(log_events(form.subscribe()));
                self.state.form = FormLoad::Ready(Box::new(form));
                self.state.focus_index = 0;
                self.state.sync_drafts();
                self.state.status_message = None;
            }
            Err(err) => {
                tracing::error!("Failed to initialize profile form: {err}");
                self.state.form = FormLoad::Failed(err.to_string());
            }
        }
    }

    /// Apply every email lookup that finished since the last call
    pub fn poll_email_checks(&mut self) {
        while let Ok((check, outcome)) = self.checks_rx.try_recv() {
            self.apply_email_check(check, outcome);
        }
    }

    fn apply_email_check(&mut self, check: EmailCheck, outcome: Result<bool, DirectoryError>) {
        if let Some(form) = self.state.controller_mut() {
            form.resolve_email_check(&check, outcome);
        }
    }

    /// Run an email lookup in the background
    fn dispatch_email_check(&self, check: Option<EmailCheck>) {
        let Some(check) = check else {
            return;
        };
        let directory = Arc::clone(&self.directory);
        let tx = self.checks_tx.clone();
        tokio::spawn(async move {
            let outcome = email_taken(directory.as_ref(), &check.email).await;
            // The app may be shutting down
            let _ = tx.send((check, outcome));
        });
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.state.error_message.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.error_message = None;
            }
            return Ok(());
        }

        match self.state.form {
            FormLoad::Loading => {
                if key.code == KeyCode::Esc {
                    self.quit = true;
                }
            }
            FormLoad::Failed(_) => match key.code {
                KeyCode::Char('r') => self.load_form().await,
                KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
            FormLoad::Ready(_) => self.handle_form_key(key).await,
        }
        Ok(())
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let focused = self.state.focused();
        let on_actions = focused == FocusTarget::Actions;
        let on_gender = focused == FocusTarget::Field(FieldKey::Gender);

        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            // Shortcuts work from anywhere
            KeyCode::Char('s') if has_action_modifier(&key) => self.submit().await,
            KeyCode::Char('n') if has_action_modifier(&key) => self.append_phone(),
            KeyCode::Char('d') if has_action_modifier(&key) => self.remove_focused_phone(),
            KeyCode::Char('r') if has_action_modifier(&key) => self.reset_form(),
            KeyCode::Char('u') if has_action_modifier(&key) => self.clear_username(),
            KeyCode::Char('t') if has_action_modifier(&key) => self.trigger_username().await,
            KeyCode::Left if on_actions => {
                self.state.selected_button = self.state.selected_button.prev();
            }
            KeyCode::Right if on_actions => {
                self.state.selected_button = self.state.selected_button.next();
            }
            KeyCode::Enter if on_actions => self.activate_button().await,
            KeyCode::Enter => self.move_focus(true),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if on_gender => {
                self.toggle_gender();
            }
            KeyCode::Char(c) if !has_action_modifier(&key) => {
                self.edit_focused(|text| text.push(c));
            }
            KeyCode::Backspace => self.edit_focused(|text| {
                text.pop();
            }),
            _ => {}
        }
    }

    /// Leave the focused field (blurring it) and move on
    fn move_focus(&mut self, forward: bool) {
        if let Some(key) = self.state.focused_field() {
            let check = self.state.controller_mut().and_then(|form| form.blur(key));
            self.dispatch_email_check(check);
        }
        if forward {
            self.state.next_focus();
        } else {
            self.state.prev_focus();
        }
    }

    /// Edit the focused text input and feed the coerced value to the form
    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(key) = self.state.focused_field() else {
            return;
        };
        if !key.is_text_input() {
            return;
        }

        let value = if let Some(draft) = self.state.drafts.for_key_mut(key) {
            edit(draft);
            match key {
                FieldKey::Age => FieldValue::number_from_input(draft),
                _ => FieldValue::date_from_input(draft),
            }
        } else {
            let Some(form) = self.state.controller() else {
                return;
            };
            let mut text = form
                .value(key)
                .map(|v| v.as_text().to_string())
                .unwrap_or_default();
            edit(&mut text);
            FieldValue::Text(text)
        };

        let check = self
            .state
            .controller_mut()
            .and_then(|form| form.change(key, value));
        self.dispatch_email_check(check);
    }

    fn toggle_gender(&mut self) {
        let Some(form) = self.state.controller_mut() else {
            return;
        };
        let next = form
            .values()
            .gender
            .map(|g| g.toggle())
            .unwrap_or_default();
        let check = form.change(FieldKey::Gender, FieldValue::Choice(Some(next)));
        self.dispatch_email_check(check);
    }

    fn append_phone(&mut self) {
        let Some(form) = self.state.controller_mut() else {
            return;
        };
        let check = form.append_phone();
        let last = form.phone_count() - 1;
        self.dispatch_email_check(check);
        self.state.focus(FocusTarget::Field(FieldKey::Phone(last)));
    }

    fn remove_focused_phone(&mut self) {
        let Some(FieldKey::Phone(index)) = self.state.focused_field() else {
            return;
        };
        let removed = self
            .state
            .controller_mut()
            .is_some_and(|form| form.remove_phone(index));
        if removed {
            self.state.clamp_focus();
            self.state.status_message = Some(format!("Removed phone {}", index + 1));
        } else {
            self.state.status_message =
                Some("The first phone number cannot be removed".to_string());
        }
    }

    fn reset_form(&mut self) {
        if let Some(form) = self.state.controller_mut() {
            form.reset();
            self.state.sync_drafts();
            self.state.clamp_focus();
            self.state.status_message = Some("Form reset".to_string());
        }
    }

    /// Clear the username the way a programmatic update would
    fn clear_username(&mut self) {
        let options = SetValueOptions {
            should_validate: true,
            should_dirty: true,
            should_touch: true,
        };
        let check = self.state.controller_mut().and_then(|form| {
            form.set_value(FieldKey::Username, FieldValue::Text(String::new()), options)
        });
        self.dispatch_email_check(check);
    }

    async fn trigger_username(&mut self) {
        let FormLoad::Ready(form) = &mut self.state.form else {
            return;
        };
        let valid = form
            .trigger(&[FieldKey::Username], self.directory.as_ref())
            .await;
        self.state.status_message = Some(if valid {
            "Username is valid".to_string()
        } else {
            "Username is invalid".to_string()
        });
    }

    async fn activate_button(&mut self) {
        match self.state.selected_button {
            ActionButton::Submit => self.submit().await,
            ActionButton::AddPhone => self.append_phone(),
            ActionButton::Reset => self.reset_form(),
        }
    }

    /// Submit the form if it is dirty and valid
    async fn submit(&mut self) {
        let FormLoad::Ready(form) = &mut self.state.form else {
            return;
        };
        if !form.can_submit() {
            self.state.status_message =
                Some("Submit is disabled until the form is changed and valid".to_string());
            return;
        }

        let outcome = form
            .submit(
                self.directory.as_ref(),
                |values| {
                    tracing::info!("Form submitted: {values:?}");
                    Ok(())
                },
                |errors| tracing::info!("Form errors: {errors:?}"),
            )
            .await;

        match outcome {
            SubmitOutcome::Submitted(values) => {
                self.state.last_submitted = Some(values);
                self.state.sync_drafts();
                self.state.clamp_focus();
                self.state.status_message = Some("Profile submitted".to_string());
            }
            SubmitOutcome::Rejected(errors) => {
                self.state.status_message =
                    Some(format!("{} field(s) need attention", errors.len()));
            }
            SubmitOutcome::HandlerFailed(message) => {
                self.state.error_message = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockUserDirectory;
    use crate::state::forms::{rules as rules_messages, Gender};
    use crate::state::User;
    use crossterm::event::KeyModifiers;

    const SEED_EMAIL: &str = "Sincere@april.biz";

    fn seed_user() -> User {
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            username: "Bret".to_string(),
            email: SEED_EMAIL.to_string(),
        }
    }

    /// Directory with the seed user, where only the seed email is taken
    fn directory() -> MockUserDirectory {
        let mut directory = MockUserDirectory::new();
        directory.expect_get_user().returning(|_| Ok(seed_user()));
        directory.expect_find_by_email().returning(|email| {
            if email == SEED_EMAIL {
                Ok(vec![seed_user()])
            } else {
                Ok(vec![])
            }
        });
        directory
    }

    async fn ready_app() -> App {
        let mut app = App::new(Arc::new(directory()), FormSettings::default());
        app.load_form().await;
        assert!(app.state.is_ready());
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    async fn clear_field(app: &mut App) {
        for _ in 0..64 {
            app.handle_key(key(KeyCode::Backspace)).await.unwrap();
        }
    }

    async fn focus(app: &mut App, target: FieldKey) {
        while app.state.focused_field() != Some(target) {
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
        }
    }

    /// Wait for the next background lookup and apply it
    async fn settle_email_check(app: &mut App) {
        let (check, outcome) = app.checks_rx.recv().await.unwrap();
        app.apply_email_check(check, outcome);
    }

    fn form(app: &App) -> &FormController {
        app.state.controller().unwrap()
    }

    mod loading {
        use super::*;

        #[tokio::test]
        async fn test_load_failure_keeps_form_unavailable() {
            let mut directory = MockUserDirectory::new();
            directory.expect_get_user().returning(|_| {
                Err(DirectoryError::Status {
                    url: "http://localhost/users/1".to_string(),
                    status: 500,
                })
            });
            let mut app = App::new(Arc::new(directory), FormSettings::default());
            app.load_form().await;

            assert!(matches!(app.state.form, FormLoad::Failed(_)));
            assert!(app.state.controller().is_none());
        }

        #[tokio::test]
        async fn test_retry_after_failure() {
            let mut directory = MockUserDirectory::new();
            let mut calls = 0;
            directory.expect_get_user().times(2).returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Err(DirectoryError::Status {
                        url: "http://localhost/users/1".to_string(),
                        status: 503,
                    })
                } else {
                    Ok(seed_user())
                }
            });
            let mut app = App::new(Arc::new(directory), FormSettings::default());
            app.load_form().await;
            assert!(!app.state.is_ready());

            app.handle_key(key(KeyCode::Char('r'))).await.unwrap();
            assert!(app.state.is_ready());
            assert_eq!(form(&app).values().email, SEED_EMAIL);
        }

        #[tokio::test]
        async fn test_esc_quits() {
            let mut app = ready_app().await;
            assert!(!app.should_quit());
            app.handle_key(key(KeyCode::Esc)).await.unwrap();
            assert!(app.should_quit());
        }
    }

    mod editing {
        use super::*;

        #[tokio::test]
        async fn test_typing_edits_focused_field() {
            let mut app = ready_app().await;
            type_text(&mut app, "!").await;
            assert_eq!(form(&app).values().username, "Batman!");
            app.handle_key(key(KeyCode::Backspace)).await.unwrap();
            assert_eq!(form(&app).values().username, "Batman");
        }

        #[tokio::test]
        async fn test_blur_validates_left_field() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Fullname).await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            assert_eq!(
                form(&app).error(FieldKey::Fullname),
                Some(rules_messages::FULLNAME_REQUIRED)
            );
        }

        #[tokio::test]
        async fn test_age_draft_is_coerced() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Age).await;
            clear_field(&mut app).await;
            assert_eq!(form(&app).values().age, None);

            type_text(&mut app, "-1").await;
            assert_eq!(app.state.drafts.age, "-1");
            assert_eq!(form(&app).values().age, Some(-1));

            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            assert_eq!(
                form(&app).error(FieldKey::Age),
                Some(rules_messages::AGE_NEGATIVE)
            );
        }

        #[tokio::test]
        async fn test_dob_draft_is_coerced() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Dob).await;
            clear_field(&mut app).await;
            assert_eq!(form(&app).values().dob, None);

            type_text(&mut app, "1980-02-19").await;
            assert_eq!(
                form(&app).values().dob,
                chrono::NaiveDate::from_ymd_opt(1980, 2, 19)
            );
        }

        #[tokio::test]
        async fn test_gender_toggles_with_space() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Gender).await;
            app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
            assert_eq!(form(&app).values().gender, Some(Gender::Female));
            app.handle_key(key(KeyCode::Right)).await.unwrap();
            assert_eq!(form(&app).values().gender, Some(Gender::Male));
        }

        #[tokio::test]
        async fn test_clear_username_shortcut() {
            let mut app = ready_app().await;
            app.handle_key(ctrl('u')).await.unwrap();
            let form = form(&app);
            assert_eq!(form.values().username, "");
            assert!(form.is_touched(FieldKey::Username));
            assert_eq!(
                form.error(FieldKey::Username),
                Some(rules_messages::USERNAME_REQUIRED)
            );
        }

        #[tokio::test]
        async fn test_trigger_username_shortcut() {
            let mut app = ready_app().await;
            app.handle_key(ctrl('t')).await.unwrap();
            assert_eq!(app.state.status_message.as_deref(), Some("Username is valid"));
        }
    }

    mod email {
        use super::*;

        #[tokio::test]
        async fn test_leaving_email_checks_uniqueness() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Email).await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            assert!(form(&app).is_checking_email());

            settle_email_check(&mut app).await;
            assert_eq!(
                form(&app).error(FieldKey::Email),
                Some(rules_messages::EMAIL_TAKEN)
            );
        }

        #[tokio::test]
        async fn test_stale_check_does_not_override_newer_value() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Email).await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            app.handle_key(key(KeyCode::BackTab)).await.unwrap();

            // Editing the touched email dispatches a second lookup
            clear_field(&mut app).await;
            type_text(&mut app, "bruce@wayne.com").await;
            // Every keystroke supersedes the previous lookup
            for _ in 0..64 {
                if !form(&app).is_checking_email() {
                    break;
                }
                settle_email_check(&mut app).await;
            }

            assert_eq!(form(&app).values().email, "bruce@wayne.com");
            assert!(form(&app).error(FieldKey::Email).is_none());
        }
    }

    mod phone {
        use super::*;

        #[tokio::test]
        async fn test_append_focuses_new_entry() {
            let mut app = ready_app().await;
            app.handle_key(ctrl('n')).await.unwrap();
            assert_eq!(form(&app).phone_count(), 2);
            assert_eq!(app.state.focused_field(), Some(FieldKey::Phone(1)));
        }

        #[tokio::test]
        async fn test_first_phone_cannot_be_removed() {
            let mut app = ready_app().await;
            focus(&mut app, FieldKey::Phone(0)).await;
            app.handle_key(ctrl('d')).await.unwrap();
            assert_eq!(form(&app).phone_count(), 1);
            assert_eq!(
                app.state.status_message.as_deref(),
                Some("The first phone number cannot be removed")
            );
        }

        #[tokio::test]
        async fn test_remove_focused_phone() {
            let mut app = ready_app().await;
            app.handle_key(ctrl('n')).await.unwrap();
            type_text(&mut app, "555-0199").await;
            app.handle_key(ctrl('d')).await.unwrap();
            assert_eq!(form(&app).phone_count(), 1);
        }
    }

    mod submission {
        use super::*;

        async fn fill_valid(app: &mut App) {
            focus(app, FieldKey::Email).await;
            clear_field(app).await;
            type_text(app, "bruce@wayne.com").await;
            for (field, text) in [
                (FieldKey::Fullname, "Bruce Wayne"),
                (FieldKey::AddressLine1, "1007 Mountain Drive"),
                (FieldKey::AddressLine2, "Gotham"),
            ] {
                focus(app, field).await;
                type_text(app, text).await;
            }
            // Blur the last field, then resolve the email lookup
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            focus(app, FieldKey::Email).await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            while form(app).is_checking_email() {
                settle_email_check(app).await;
            }
        }

        #[tokio::test]
        async fn test_submit_disabled_for_pristine_form() {
            let mut app = ready_app().await;
            app.handle_key(ctrl('s')).await.unwrap();
            assert_eq!(form(&app).submit_count(), 0);
            assert!(app.state.last_submitted.is_none());
        }

        #[tokio::test]
        async fn test_submit_resets_to_defaults() {
            let mut app = ready_app().await;
            fill_valid(&mut app).await;
            assert!(form(&app).can_submit());

            app.handle_key(ctrl('s')).await.unwrap();

            let submitted = app.state.last_submitted.clone().unwrap();
            assert_eq!(submitted.fullname, "Bruce Wayne");
            assert_eq!(submitted.email, "bruce@wayne.com");
            let form = form(&app);
            assert_eq!(form.values(), form.defaults());
            assert_eq!(app.state.drafts.age, "0");
            assert_eq!(app.state.status_message.as_deref(), Some("Profile submitted"));
        }

        #[tokio::test]
        async fn test_reset_button() {
            let mut app = ready_app().await;
            type_text(&mut app, "man").await;
            app.state.focus(FocusTarget::Actions);
            app.handle_key(key(KeyCode::Right)).await.unwrap();
            app.handle_key(key(KeyCode::Right)).await.unwrap();
            assert_eq!(app.state.selected_button, ActionButton::Reset);

            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            assert_eq!(form(&app).values().username, "Batman");
        }
    }

    #[tokio::test]
    async fn test_error_dialog_swallows_keys_until_dismissed() {
        let mut app = ready_app().await;
        app.state.error_message = Some("boom".to_string());
        app.handle_key(key(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(form(&app).values().username, "Batman");
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert!(app.state.error_message.is_none());
    }
}
