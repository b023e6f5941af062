//! Synchronous validation rules for the profile form

use super::field::FieldKey;
use super::values::FormValues;
use regex::Regex;
use std::sync::OnceLock;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const EMAIL_INVALID: &str = "Invalid email format";
pub const EMAIL_RESERVED: &str = "Enter a different email address";
pub const EMAIL_DOMAIN_BLOCKED: &str = "This domain is not supported";
pub const EMAIL_TAKEN: &str = "Email already exists";
pub const EMAIL_UNVERIFIED: &str = "Unable to verify email address";
pub const FULLNAME_REQUIRED: &str = "FullName is required";
pub const ADDRESS_REQUIRED: &str = "Address is required";
pub const AGE_REQUIRED: &str = "Age is required";
pub const AGE_NEGATIVE: &str = "Age must be a non-negative number";
pub const DOB_REQUIRED: &str = "Date of Birth is required";
pub const GENDER_REQUIRED: &str = "Please select your gender";

const EMAIL_PATTERN: &str =
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Field rules parameterized by the configured email restrictions
#[derive(Debug, Clone)]
pub struct Rules {
    reserved_email: String,
    blocked_domain: String,
}

impl Rules {
    pub fn new(reserved_email: impl Into<String>, blocked_domain: impl Into<String>) -> Self {
        Self {
            reserved_email: reserved_email.into(),
            blocked_domain: blocked_domain.into(),
        }
    }

    /// Run every synchronous rule for `key`; the first failure wins.
    ///
    /// The email uniqueness rule is asynchronous and handled by the controller.
    pub fn check(&self, key: FieldKey, values: &FormValues) -> Result<(), &'static str> {
        match key {
            FieldKey::Username => required(&values.username, USERNAME_REQUIRED),
            FieldKey::Email => self.check_email(&values.email),
            FieldKey::Fullname => required(&values.fullname, FULLNAME_REQUIRED),
            FieldKey::AddressLine1 => required(&values.address.line1, ADDRESS_REQUIRED),
            FieldKey::AddressLine2 => required(&values.address.line2, ADDRESS_REQUIRED),
            FieldKey::Age => match values.age {
                None => Err(AGE_REQUIRED),
                Some(age) if age < 0 => Err(AGE_NEGATIVE),
                Some(_) => Ok(()),
            },
            FieldKey::Dob => values.dob.map(|_| ()).ok_or(DOB_REQUIRED),
            FieldKey::Gender => values.gender.map(|_| ()).ok_or(GENDER_REQUIRED),
            FieldKey::Phone(_) => Ok(()),
        }
    }

    fn check_email(&self, email: &str) -> Result<(), &'static str> {
        if !email_pattern().is_match(email) {
            return Err(EMAIL_INVALID);
        }
        if email == self.reserved_email {
            return Err(EMAIL_RESERVED);
        }
        if !self.blocked_domain.is_empty() && email.ends_with(&self.blocked_domain) {
            return Err(EMAIL_DOMAIN_BLOCKED);
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new("admin@example.com", "baddomain.com")
    }
}

fn required(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.is_empty() {
        Err(message)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::values::Gender;
    use chrono::NaiveDate;

    fn values() -> FormValues {
        FormValues::seeded(
            "Batman",
            "bruce@wayne.com",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn check(key: FieldKey, values: &FormValues) -> Result<(), &'static str> {
        Rules::default().check(key, values)
    }

    mod required_fields {
        use super::*;

        #[test]
        fn test_empty_username() {
            let mut v = values();
            v.username.clear();
            assert_eq!(check(FieldKey::Username, &v), Err(USERNAME_REQUIRED));
        }

        #[test]
        fn test_empty_fullname() {
            let v = values();
            assert_eq!(check(FieldKey::Fullname, &v), Err(FULLNAME_REQUIRED));
        }

        #[test]
        fn test_empty_address_lines() {
            let v = values();
            assert_eq!(check(FieldKey::AddressLine1, &v), Err(ADDRESS_REQUIRED));
            assert_eq!(check(FieldKey::AddressLine2, &v), Err(ADDRESS_REQUIRED));
        }

        #[test]
        fn test_missing_dob() {
            let mut v = values();
            v.dob = None;
            assert_eq!(check(FieldKey::Dob, &v), Err(DOB_REQUIRED));
        }

        #[test]
        fn test_missing_gender() {
            let mut v = values();
            v.gender = None;
            assert_eq!(check(FieldKey::Gender, &v), Err(GENDER_REQUIRED));
            v.gender = Some(Gender::Female);
            assert_eq!(check(FieldKey::Gender, &v), Ok(()));
        }

        #[test]
        fn test_phone_has_no_rules() {
            let v = values();
            assert_eq!(check(FieldKey::Phone(0), &v), Ok(()));
        }
    }

    mod age {
        use super::*;

        #[test]
        fn test_missing_age() {
            let mut v = values();
            v.age = None;
            assert_eq!(check(FieldKey::Age, &v), Err(AGE_REQUIRED));
        }

        #[test]
        fn test_negative_age() {
            let mut v = values();
            v.age = Some(-1);
            assert_eq!(check(FieldKey::Age, &v), Err(AGE_NEGATIVE));
        }

        #[test]
        fn test_zero_age_passes() {
            let v = values();
            assert_eq!(v.age, Some(0));
            assert_eq!(check(FieldKey::Age, &v), Ok(()));
        }
    }

    mod email {
        use super::*;

        fn with_email(email: &str) -> FormValues {
            let mut v = values();
            v.email = email.to_string();
            v
        }

        #[test]
        fn test_valid_email_passes() {
            assert_eq!(check(FieldKey::Email, &with_email("Sincere@april.biz")), Ok(()));
        }

        #[test]
        fn test_empty_email_is_invalid_format() {
            assert_eq!(check(FieldKey::Email, &with_email("")), Err(EMAIL_INVALID));
        }

        #[test]
        fn test_malformed_email() {
            assert_eq!(check(FieldKey::Email, &with_email("not-an-email")), Err(EMAIL_INVALID));
            assert_eq!(check(FieldKey::Email, &with_email("a@b..c")), Err(EMAIL_INVALID));
        }

        #[test]
        fn test_reserved_email() {
            assert_eq!(
                check(FieldKey::Email, &with_email("admin@example.com")),
                Err(EMAIL_RESERVED)
            );
        }

        #[test]
        fn test_blocked_domain() {
            assert_eq!(
                check(FieldKey::Email, &with_email("someone@baddomain.com")),
                Err(EMAIL_DOMAIN_BLOCKED)
            );
        }

        #[test]
        fn test_custom_rules() {
            let rules = Rules::new("root@corp.io", "spam.net");
            assert_eq!(
                rules.check(FieldKey::Email, &with_email("root@corp.io")),
                Err(EMAIL_RESERVED)
            );
            assert_eq!(
                rules.check(FieldKey::Email, &with_email("x@spam.net")),
                Err(EMAIL_DOMAIN_BLOCKED)
            );
            assert_eq!(rules.check(FieldKey::Email, &with_email("admin@example.com")), Ok(()));
        }
    }
}
