//! User records returned by the user directory

use serde::{Deserialize, Serialize};

/// A user directory record. Only the fields the form reads are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
}
