//! Form domain layer
//!
//! Typed field keys and values, the synchronous rule set, the controller that
//! owns validation and submission state, and its change notifications.

mod controller;
mod field;
pub mod rules;
mod values;
mod watch;

pub use controller::{EmailCheck, FormController, FormSettings, SetValueOptions, SubmitOutcome};
pub use field::{FieldKey, FieldValue, DATE_FORMAT};
pub use values::{FormValues, Gender};
pub use watch::log_events;
