//! Form field keys and value objects

use super::values::Gender;
use chrono::NaiveDate;
use std::fmt;

/// Date format accepted by the date-of-birth input
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every addressable field of the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Username,
    Email,
    Fullname,
    AddressLine1,
    AddressLine2,
    Age,
    Dob,
    /// Number of the phone entry at the given position
    Phone(usize),
    Gender,
}

impl FieldKey {
    /// Fields that carry validation rules, in display order
    pub const VALIDATED: [FieldKey; 8] = [
        FieldKey::Username,
        FieldKey::Email,
        FieldKey::Fullname,
        FieldKey::AddressLine1,
        FieldKey::AddressLine2,
        FieldKey::Age,
        FieldKey::Dob,
        FieldKey::Gender,
    ];

    /// Dotted path of the field inside the value record
    pub fn path(&self) -> String {
        match self {
            FieldKey::Username => "username".to_string(),
            FieldKey::Email => "email".to_string(),
            FieldKey::Fullname => "fullname".to_string(),
            FieldKey::AddressLine1 => "address.line1".to_string(),
            FieldKey::AddressLine2 => "address.line2".to_string(),
            FieldKey::Age => "age".to_string(),
            FieldKey::Dob => "dob".to_string(),
            FieldKey::Phone(index) => format!("phone.{index}.number"),
            FieldKey::Gender => "gender".to_string(),
        }
    }

    /// Human readable label for rendering
    pub fn label(&self) -> String {
        match self {
            FieldKey::Username => "Username".to_string(),
            FieldKey::Email => "E-mail".to_string(),
            FieldKey::Fullname => "Full Name".to_string(),
            FieldKey::AddressLine1 => "Address Line 1".to_string(),
            FieldKey::AddressLine2 => "Address Line 2".to_string(),
            FieldKey::Age => "Age".to_string(),
            FieldKey::Dob => "Date of Birth".to_string(),
            FieldKey::Phone(index) => format!("Phone {}", index + 1),
            FieldKey::Gender => "Gender".to_string(),
        }
    }

    /// Whether the field is edited by typing characters
    pub fn is_text_input(&self) -> bool {
        !matches!(self, FieldKey::Gender)
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, FieldKey::Phone(_))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Numeric input; `None` when the input is empty or not a number
    Number(Option<i64>),
    /// Date input; `None` when the input is empty or not a date
    Date(Option<NaiveDate>),
    Choice(Option<Gender>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Coerce raw numeric input the way a number input does
    pub fn number_from_input(input: &str) -> Self {
        FieldValue::Number(input.trim().parse().ok())
    }

    /// Coerce raw date input the way a date input does
    pub fn date_from_input(input: &str) -> Self {
        FieldValue::Date(NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok())
    }

    /// Get the text value (returns empty string for non-text values)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            FieldValue::Date(d) => d
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            FieldValue::Choice(g) => g.map(|g| g.label().to_string()).unwrap_or_default(),
        }
    }
}
