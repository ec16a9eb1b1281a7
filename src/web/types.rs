//! Most of the structs in `web` module and their implementations live here.
//! Includes the submitted form, its validated counterparts, the field error set and tests for those.

use std::collections::BTreeMap;

use derive_more::Deref;
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

pub const EMAIL_FIELD: &str = "email";
/// Key used for errors that don't belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";
pub const EMAIL_MAX_LEN: usize = 254;

// ###################################
// ->   STRUCTS
// ###################################
/// The form posted by the landing page.
/// Fields are optional so that a missing field ends up as a field error instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionForm {
    #[serde(default)]
    pub email: Option<String>,
}

impl SubscriptionForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// Validates every field, returning the normalized email or the errors keyed by field name.
    pub fn validate(self) -> Result<ValidEmail, FieldErrors> {
        ValidEmail::parse(self.email.unwrap_or_default())
            .map_err(|er| FieldErrors::single(EMAIL_FIELD, er))
    }
}

/// Validated Subscriber Email, stripped of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        let len = value.graphemes(true).count();
        if len > EMAIL_MAX_LEN {
            return Err(DataParsingError::EmailTooLong(len));
        }

        if value.validate_email() && has_public_domain(value) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// `validate_email` accepts single label domains like `user@example`.
/// The domain needs a dot and an alphabetic TLD, `localhost` and IP literals are the only exceptions.
fn has_public_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if domain.eq_ignore_ascii_case("localhost") || domain.starts_with('[') {
        return true;
    }

    regex_is_match!(
        r"^(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?\.)+(?:\p{L}[\p{L}-]{0,61}\p{L}|xn--[a-z0-9]{1,59})$"i,
        domain
    )
}

/// Validation messages keyed by field name, every field can collect more than one message.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deref)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &str, message: impl ToString) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl ToString) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_string());
    }
}

/// Describes how the email input gets rendered on the landing page.
#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub placeholder: &'static str,
    pub css_class: &'static str,
}

impl FormField {
    pub fn email() -> Self {
        Self {
            name: EMAIL_FIELD,
            label: "Email Address",
            input_type: "email",
            placeholder: "you@example.com",
            css_class: "w-full px-4 py-3 border border-gray-300 rounded-lg focus:outline-none \
                focus:ring-2 focus:ring-blue-500 focus:border-transparent transition",
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
/// The messages are shown to the user as they are.
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("This field is required.")]
    EmailMissing,
    #[error("Ensure this value has at most {max} characters (it has {0}).", max = EMAIL_MAX_LEN)]
    EmailTooLong(usize),
    #[error("Enter a valid email address.")]
    EmailInvalid,
}
