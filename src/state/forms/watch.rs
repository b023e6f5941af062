//! Change notifications published by the form controller

use super::field::FieldKey;
use super::values::FormValues;
use tokio::sync::broadcast;

/// Buffered events per subscriber before it starts lagging
pub const WATCH_CAPACITY: usize = 64;

/// What kind of mutation produced a watch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// User input on a field
    Input,
    /// Programmatic `set_value`
    SetValue,
    /// Phone entry appended
    Append,
    /// Phone entry removed
    Remove,
    /// Whole form restored to its defaults
    Reset,
}

/// Snapshot of the form after a change
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub values: FormValues,
    /// Field that changed; `None` for whole-form changes
    pub name: Option<FieldKey>,
    pub kind: ChangeKind,
}

/// Log every event from a subscription until the controller goes away
pub async fn log_events(mut events: broadcast::Receiver<WatchEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let name = event.name.map(|k| k.path()).unwrap_or_default();
                tracing::debug!(
                    name = %name,
                    kind = ?event.kind,
                    values = ?event.values,
                    "form value changed"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Watch logger lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
