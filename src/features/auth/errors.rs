//! Canonical auth error representation. Every failure the auth flows can
//! produce is resolved into a [`FormErrors`] map (field or `general` to
//! message) before it reaches a caller that renders it.

use crate::app_lib::AppError;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use thiserror::Error;

/// Message shown for transport failures of any kind.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
/// Message shown when the server rejects a login without saying why.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    TotpCode,
    CurrentPassword,
    NewPassword,
    ConfirmPassword,
    Name,
    /// Not tied to an input; shown above the form.
    General,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::TotpCode => "totp_code",
            Field::CurrentPassword => "current_password",
            Field::NewPassword => "new_password",
            Field::ConfirmPassword => "confirm_password",
            Field::Name => "name",
            Field::General => "general",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map holding a single message for `field`.
    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Records a message; the first message recorded for a field wins.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn general(&self) -> Option<&str> {
        self.get(Field::General)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Returns `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Failure of one login submission.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Local input check failed; no request was sent.
    #[error("invalid input: {0}")]
    Validation(FormErrors),
    /// The server answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// The request could not be sent or the answer could not be decoded.
    #[error("network failure: {0}")]
    Network(AppError),
}

impl LoginError {
    /// Resolves the error into the map the login form renders.
    #[must_use]
    pub fn into_form_errors(self) -> FormErrors {
        match self {
            LoginError::Validation(errors) => errors,
            LoginError::Rejected(message) => FormErrors::single(Field::General, message),
            LoginError::Network(_) => FormErrors::single(Field::General, NETWORK_ERROR_MESSAGE),
        }
    }
}

impl From<FormErrors> for LoginError {
    fn from(errors: FormErrors) -> Self {
        LoginError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.insert(Field::Email, "Email is required");
        errors.insert(Field::Email, "Please enter a valid email address");
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
    }

    #[test]
    fn serializes_as_field_keyed_map() {
        let mut errors = FormErrors::new();
        errors.insert(Field::TotpCode, "Please enter the 6-digit code");
        errors.insert(Field::General, "Login failed");
        let value = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "totp_code": "Please enter the 6-digit code",
                "general": "Login failed"
            })
        );
    }

    #[test]
    fn network_errors_render_generic_message() {
        let errors =
            LoginError::Network(AppError::Network("connection refused".to_string()))
                .into_form_errors();
        assert_eq!(errors.general(), Some(NETWORK_ERROR_MESSAGE));
    }

    #[test]
    fn display_joins_fields() {
        let mut errors = FormErrors::new();
        errors.insert(Field::Password, "Password is required");
        errors.insert(Field::Email, "Email is required");
        assert_eq!(
            errors.to_string(),
            "email: Email is required; password: Password is required"
        );
    }
}
