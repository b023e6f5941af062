//! Profile form controller
//!
//! Owns the field values, their initialized defaults and all derived
//! validation state. Every mutation goes through the methods below, which
//! apply the touch-then-change validation policy and publish a
//! [`WatchEvent`] to subscribers.
//!
//! The email uniqueness rule needs the user directory. Mutators that make the
//! email field eligible for that check return an [`EmailCheck`] ticket; the
//! caller runs the lookup wherever it likes and hands the outcome back to
//! [`FormController::resolve_email_check`], which drops outcomes whose ticket
//! no longer matches the current email value.

use super::field::{FieldKey, FieldValue};
use super::rules::{self, Rules};
use super::values::{FormValues, PhoneEntry};
use super::watch::{ChangeKind, WatchEvent, WATCH_CAPACITY};
use crate::directory::{email_taken, DirectoryError, UserDirectory};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::broadcast;

/// Error messages keyed by field
pub type FieldErrors = BTreeMap<FieldKey, String>;

/// Parameters for building the initial form
#[derive(Debug, Clone)]
pub struct FormSettings {
    /// Directory id of the user that seeds the email field
    pub seed_user_id: u32,
    /// Username the form always starts with
    pub default_username: String,
    pub reserved_email: String,
    pub blocked_domain: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            seed_user_id: 1,
            default_username: "Batman".to_string(),
            reserved_email: "admin@example.com".to_string(),
            blocked_domain: "baddomain.com".to_string(),
        }
    }
}

impl FormSettings {
    pub fn rules(&self) -> Rules {
        Rules::new(&self.reserved_email, &self.blocked_domain)
    }
}

/// Submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmitPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Success handler ran with this snapshot; the form has been reset
    Submitted(FormValues),
    /// Validation failed with these errors
    Rejected(FieldErrors),
    /// Validation passed but the success handler returned an error
    HandlerFailed(String),
}

/// Options for programmatic updates through [`FormController::set_value`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SetValueOptions {
    pub should_validate: bool,
    pub should_dirty: bool,
    pub should_touch: bool,
}

/// A dispatched email uniqueness lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCheck {
    pub generation: u64,
    pub email: String,
}

/// Uniqueness status of one email value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Pending,
    Available,
    Taken,
    Unverified,
}

pub struct FormController {
    rules: Rules,
    defaults: FormValues,
    values: FormValues,
    errors: FieldErrors,
    touched: BTreeSet<FieldKey>,
    dirty: BTreeSet<FieldKey>,
    /// Bumped on every value change of the key
    generations: BTreeMap<FieldKey, u64>,
    /// Uniqueness status and the email value it applies to
    email_status: Option<(String, Availability)>,
    phase: SubmitPhase,
    is_submitted: bool,
    submit_count: u32,
    watchers: broadcast::Sender<WatchEvent>,
}

impl FormController {
    /// Create a controller whose defaults are `defaults`
    pub fn new(defaults: FormValues, rules: Rules) -> Self {
        let (watchers, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            rules,
            values: defaults.clone(),
            defaults,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            generations: BTreeMap::new(),
            email_status: None,
            phase: SubmitPhase::Idle,
            is_submitted: false,
            submit_count: 0,
            watchers,
        }
    }

    /// Fetch the seed record and build the initial form from it
    pub async fn load(
        directory: &dyn UserDirectory,
        settings: &FormSettings,
    ) -> Result<Self, DirectoryError> {
        let seed = directory.get_user(settings.seed_user_id).await?;
        tracing::info!(
            "Loaded seed user {} ({}) for the profile form",
            seed.id,
            seed.email
        );
        let today = chrono::Local::now().date_naive();
        let defaults = FormValues::seeded(&settings.default_username, &seed.email, today);
        Ok(Self::new(defaults, settings.rules()))
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn defaults(&self) -> &FormValues {
        &self.defaults
    }

    pub fn value(&self, key: FieldKey) -> Option<FieldValue> {
        self.values.get(key)
    }

    pub fn error(&self, key: FieldKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn touched_fields(&self) -> &BTreeSet<FieldKey> {
        &self.touched
    }

    pub fn dirty_fields(&self) -> &BTreeSet<FieldKey> {
        &self.dirty
    }

    pub fn is_touched(&self, key: FieldKey) -> bool {
        self.touched.contains(&key)
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    /// Whether every rule passes for the current values, touched or not.
    ///
    /// The email field only counts as valid once the directory confirmed the
    /// current address is unused.
    pub fn is_valid(&self) -> bool {
        let sync_ok = FieldKey::VALIDATED
            .iter()
            .all(|key| self.rules.check(*key, &self.values).is_ok());
        sync_ok && self.email_availability() == Some(Availability::Available)
    }

    /// Whether a pending uniqueness lookup applies to the current email
    pub fn is_checking_email(&self) -> bool {
        self.email_availability() == Some(Availability::Pending)
    }

    pub fn can_submit(&self) -> bool {
        self.is_dirty() && self.is_valid()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn phone_count(&self) -> usize {
        self.values.phone.len()
    }

    /// Subscribe to change notifications; drop the receiver to unsubscribe
    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.watchers.subscribe()
    }

    /// Apply user input to a field
    pub fn change(&mut self, key: FieldKey, value: FieldValue) -> Option<EmailCheck> {
        if !self.values.set(key, value) {
            return None;
        }
        self.bump(key);
        self.refresh_dirty(key);
        self.publish(Some(key), ChangeKind::Input);
        self.revalidate()
    }

    /// The field lost focus: mark it touched and validate it
    pub fn blur(&mut self, key: FieldKey) -> Option<EmailCheck> {
        if self.values.get(key).is_none() {
            return None;
        }
        self.touched.insert(key);
        if key == FieldKey::Email {
            return self.requery_email(false);
        }
        self.validate_key(key)
    }

    /// Programmatic update with explicit dirty/touch/validate behavior
    pub fn set_value(
        &mut self,
        key: FieldKey,
        value: FieldValue,
        options: SetValueOptions,
    ) -> Option<EmailCheck> {
        if self.values.get(key).is_none() {
            return None;
        }
        if self.values.set(key, value) {
            self.bump(key);
            self.publish(Some(key), ChangeKind::SetValue);
        }
        if options.should_dirty {
            self.refresh_dirty(key);
        }
        if options.should_touch {
            self.touched.insert(key);
        }
        if options.should_validate {
            self.validate_key(key)
        } else {
            None
        }
    }

    /// Add an empty phone entry at the end
    pub fn append_phone(&mut self) -> Option<EmailCheck> {
        self.values.phone.push(PhoneEntry::default());
        let key = FieldKey::Phone(self.values.phone.len() - 1);
        self.refresh_phone_dirty();
        self.publish(Some(key), ChangeKind::Append);
        self.revalidate()
    }

    /// Remove the phone entry at `index`.
    ///
    /// The first entry can never be removed; returns `false` when nothing was
    /// removed.
    pub fn remove_phone(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.values.phone.len() {
            tracing::debug!("Ignoring removal of phone entry {index}");
            return false;
        }
        self.values.phone.remove(index);
        self.touched = shift_phone_keys(&self.touched, index);
        self.refresh_phone_dirty();
        self.publish(Some(FieldKey::Phone(index)), ChangeKind::Remove);
        // Removal never touches the email value, so no lookup is needed
        let _ = self.revalidate();
        true
    }

    /// Restore the initialized defaults and clear all validation and
    /// submission state. In-flight email lookups become stale.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.errors.clear();
        self.touched.clear();
        self.dirty.clear();
        for key in self.defaults.keys() {
            self.bump(key);
        }
        self.email_status = None;
        self.phase = SubmitPhase::Idle;
        self.is_submitted = false;
        self.submit_count = 0;
        self.publish(None, ChangeKind::Reset);
    }

    /// Apply the outcome of a dispatched email lookup.
    ///
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn resolve_email_check(
        &mut self,
        check: &EmailCheck,
        outcome: Result<bool, DirectoryError>,
    ) -> bool {
        if check.generation != self.generation(FieldKey::Email) || check.email != self.values.email
        {
            tracing::debug!(
                "Discarding stale email check for {} (generation {})",
                check.email,
                check.generation
            );
            return false;
        }

        let availability = match outcome {
            Ok(false) => Availability::Available,
            Ok(true) => Availability::Taken,
            Err(err) => {
                tracing::warn!("Email check for {} failed: {err}", check.email);
                Availability::Unverified
            }
        };
        self.email_status = Some((check.email.clone(), availability));
        // A sync rule may have started failing since dispatch
        let _ = self.validate_key(FieldKey::Email);
        true
    }

    /// Validate `keys` now (every validated field when empty), awaiting the
    /// email lookup if one is needed. Returns whether all of them are valid.
    pub async fn trigger(&mut self, keys: &[FieldKey], directory: &dyn UserDirectory) -> bool {
        let keys: Vec<FieldKey> = if keys.is_empty() {
            FieldKey::VALIDATED.to_vec()
        } else {
            keys.to_vec()
        };

        for key in &keys {
            let check = if *key == FieldKey::Email {
                // Never trust an in-flight or failed lookup here
                self.requery_email(true)
            } else {
                self.validate_key(*key)
            };
            if let Some(check) = check {
                let outcome = email_taken(directory, &check.email).await;
                self.resolve_email_check(&check, outcome);
            }
        }

        keys.iter().all(|key| !self.errors.contains_key(key))
    }

    /// Validate the whole form and hand the result to one of the handlers.
    ///
    /// On success the form resets to its initialized defaults afterwards.
    pub async fn submit<S, E>(
        &mut self,
        directory: &dyn UserDirectory,
        on_valid: S,
        on_invalid: E,
    ) -> SubmitOutcome
    where
        S: FnOnce(&FormValues) -> anyhow::Result<()>,
        E: FnOnce(&FieldErrors),
    {
        self.phase = SubmitPhase::Submitting;
        self.is_submitted = true;
        self.submit_count += 1;
        tracing::info!("Submitting profile form (attempt {})", self.submit_count);

        if !self.trigger(&[], directory).await {
            self.phase = SubmitPhase::Failed;
            tracing::info!("Profile form rejected with {} errors", self.errors.len());
            on_invalid(&self.errors);
            return SubmitOutcome::Rejected(self.errors.clone());
        }

        let snapshot = self.values.clone();
        match on_valid(&snapshot) {
            Ok(()) => {
                self.phase = SubmitPhase::Succeeded;
                tracing::info!("Profile form submitted");
                self.reset();
                SubmitOutcome::Submitted(snapshot)
            }
            Err(err) => {
                self.phase = SubmitPhase::Failed;
                tracing::warn!("Submit handler failed: {err:#}");
                SubmitOutcome::HandlerFailed(format!("{err:#}"))
            }
        }
    }

    fn generation(&self, key: FieldKey) -> u64 {
        self.generations.get(&key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: FieldKey) {
        *self.generations.entry(key).or_insert(0) += 1;
    }

    fn publish(&self, name: Option<FieldKey>, kind: ChangeKind) {
        // No subscribers is fine
        let _ = self.watchers.send(WatchEvent {
            values: self.values.clone(),
            name,
            kind,
        });
    }

    fn refresh_dirty(&mut self, key: FieldKey) {
        if self.values.get(key) != self.defaults.get(key) {
            self.dirty.insert(key);
        } else {
            self.dirty.remove(&key);
        }
    }

    fn refresh_phone_dirty(&mut self) {
        self.dirty.retain(|key| !key.is_phone());
        for index in 0..self.values.phone.len() {
            self.refresh_dirty(FieldKey::Phone(index));
        }
    }

    fn email_availability(&self) -> Option<Availability> {
        match &self.email_status {
            Some((email, availability)) if *email == self.values.email => Some(*availability),
            _ => None,
        }
    }

    /// Revalidate every field the policy currently watches
    fn revalidate(&mut self) -> Option<EmailCheck> {
        let watched: Vec<FieldKey> = FieldKey::VALIDATED
            .iter()
            .copied()
            .filter(|key| self.is_submitted || self.touched.contains(key))
            .collect();

        let mut check = None;
        for key in watched {
            if let Some(dispatched) = self.validate_key(key) {
                check = Some(dispatched);
            }
        }
        check
    }

    /// Validate the email, issuing a fresh lookup when the last one failed
    /// (or, with `include_pending`, is still in flight). A fresh lookup bumps
    /// the generation so the earlier ticket can no longer resolve.
    fn requery_email(&mut self, include_pending: bool) -> Option<EmailCheck> {
        if let Some(check) = self.validate_key(FieldKey::Email) {
            return Some(check);
        }
        let retry = match self.email_availability() {
            Some(Availability::Unverified) => true,
            Some(Availability::Pending) => include_pending,
            _ => false,
        };
        if !retry || self.rules.check(FieldKey::Email, &self.values).is_err() {
            return None;
        }
        self.bump(FieldKey::Email);
        self.email_status = None;
        self.validate_key(FieldKey::Email)
    }

    /// Run the rules for one field and record the outcome
    fn validate_key(&mut self, key: FieldKey) -> Option<EmailCheck> {
        if let Err(message) = self.rules.check(key, &self.values) {
            self.errors.insert(key, message.to_string());
            return None;
        }
        if key != FieldKey::Email {
            self.errors.remove(&key);
            return None;
        }

        match self.email_availability() {
            Some(Availability::Available) => {
                self.errors.remove(&key);
                None
            }
            Some(Availability::Taken) => {
                self.errors.insert(key, rules::EMAIL_TAKEN.to_string());
                None
            }
            Some(Availability::Unverified) => {
                self.errors.insert(key, rules::EMAIL_UNVERIFIED.to_string());
                None
            }
            Some(Availability::Pending) => {
                self.errors.remove(&key);
                None
            }
            None => {
                self.errors.remove(&key);
                let email = self.values.email.clone();
                self.email_status = Some((email.clone(), Availability::Pending));
                let check = EmailCheck {
                    generation: self.generation(FieldKey::Email),
                    email,
                };
                tracing::debug!(
                    "Dispatching email check for {} (generation {})",
                    check.email,
                    check.generation
                );
                Some(check)
            }
        }
    }
}

/// Re-key phone entries after the one at `removed` was deleted
fn shift_phone_keys(keys: &BTreeSet<FieldKey>, removed: usize) -> BTreeSet<FieldKey> {
    keys.iter()
        .filter_map(|key| match *key {
            FieldKey::Phone(index) if index == removed => None,
            FieldKey::Phone(index) if index > removed => Some(FieldKey::Phone(index - 1)),
            other => Some(other),
        })
        .collect()
}
