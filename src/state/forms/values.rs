//! Profile form value record

use super::field::{FieldKey, FieldValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender radio choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    pub number: String,
}

/// Complete set of values held by the profile form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub address: Address,
    pub age: Option<i64>,
    pub dob: Option<NaiveDate>,
    /// Never empty
    pub phone: Vec<PhoneEntry>,
    pub gender: Option<Gender>,
}

impl FormValues {
    /// Initial values: fixed username, seeded email, static defaults elsewhere
    pub fn seeded(username: &str, email: &str, today: NaiveDate) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            fullname: String::new(),
            address: Address::default(),
            age: Some(0),
            dob: Some(today),
            phone: vec![PhoneEntry::default()],
            gender: Some(Gender::Male),
        }
    }

    /// Read a single field; `None` for a phone index past the end
    pub fn get(&self, key: FieldKey) -> Option<FieldValue> {
        let value = match key {
            FieldKey::Username => FieldValue::Text(self.username.clone()),
            FieldKey::Email => FieldValue::Text(self.email.clone()),
            FieldKey::Fullname => FieldValue::Text(self.fullname.clone()),
            FieldKey::AddressLine1 => FieldValue::Text(self.address.line1.clone()),
            FieldKey::AddressLine2 => FieldValue::Text(self.address.line2.clone()),
            FieldKey::Age => FieldValue::Number(self.age),
            FieldKey::Dob => FieldValue::Date(self.dob),
            FieldKey::Phone(index) => FieldValue::Text(self.phone.get(index)?.number.clone()),
            FieldKey::Gender => FieldValue::Choice(self.gender),
        };
        Some(value)
    }

    /// Write a single field.
    ///
    /// Returns `true` only when the stored value actually changed. A value of
    /// the wrong kind for the key, or a phone index past the end, is ignored.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> bool {
        match (key, value) {
            (FieldKey::Username, FieldValue::Text(v)) => replace(&mut self.username, v),
            (FieldKey::Email, FieldValue::Text(v)) => replace(&mut self.email, v),
            (FieldKey::Fullname, FieldValue::Text(v)) => replace(&mut self.fullname, v),
            (FieldKey::AddressLine1, FieldValue::Text(v)) => replace(&mut self.address.line1, v),
            (FieldKey::AddressLine2, FieldValue::Text(v)) => replace(&mut self.address.line2, v),
            (FieldKey::Age, FieldValue::Number(v)) => replace(&mut self.age, v),
            (FieldKey::Dob, FieldValue::Date(v)) => replace(&mut self.dob, v),
            (FieldKey::Phone(index), FieldValue::Text(v)) => match self.phone.get_mut(index) {
                Some(entry) => replace(&mut entry.number, v),
                None => false,
            },
            (FieldKey::Gender, FieldValue::Choice(v)) => replace(&mut self.gender, v),
            _ => false,
        }
    }

    /// All keys currently addressable, in display order
    pub fn keys(&self) -> Vec<FieldKey> {
        let mut keys = vec![
            FieldKey::Username,
            FieldKey::Email,
            FieldKey::Fullname,
            FieldKey::AddressLine1,
            FieldKey::AddressLine2,
            FieldKey::Age,
            FieldKey::Dob,
        ];
        keys.extend((0..self.phone.len()).map(FieldKey::Phone));
        keys.push(FieldKey::Gender);
        keys
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
