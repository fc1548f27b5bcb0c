//! Field validators for identity-bearing payloads.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const SECRET_MIN_LEN: usize = 8;
pub const SECRET_MAX_LEN: usize = 30;

static SECRET_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9$_@.#]+$").expect("secret charset pattern"));

static PHONE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+998\d{9}$").expect("phone pattern"));

/// A rejected identity field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("full name must contain a first and a last name")]
    InvalidName,

    #[error("password length should be 8 to 30 characters")]
    WeakSecret,

    #[error("password may only contain letters, digits and @ $ _ . #")]
    SecretCharset,

    #[error("phone number must be +998 followed by 9 digits")]
    InvalidPhone,
}

impl ValidationError {
    /// Payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidName => "full_name",
            ValidationError::WeakSecret
            | ValidationError::SecretCharset => "password",
            ValidationError::InvalidPhone => "phone",
        }
    }

    /// Envelope description for the failure.
    pub fn description(&self) -> &'static str {
        match self {
            ValidationError::InvalidName => "full name is not valid",
            ValidationError::WeakSecret
            | ValidationError::SecretCharset => "password is not valid",
            ValidationError::InvalidPhone => "phone number is not valid",
        }
    }

    /// Whether this failure belongs to a format rule that `validation.strict` controls.
    pub fn is_format_rule(&self) -> bool {
        matches!(
            self,
            ValidationError::SecretCharset | ValidationError::InvalidPhone
        )
    }
}

/// At least two whitespace-separated components.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    if name.split_whitespace().count() < 2 {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// Non-empty, 8 to 30 characters, restricted charset.
pub fn validate_secret(secret: &str) -> Result<(), ValidationError> {
    let len = secret.chars().count();
    if !(SECRET_MIN_LEN..=SECRET_MAX_LEN).contains(&len) {
        return Err(ValidationError::WeakSecret);
    }
    if !SECRET_CHARSET.is_match(secret) {
        return Err(ValidationError::SecretCharset);
    }
    Ok(())
}

/// `+998` followed by exactly nine digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_FORMAT.is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}
