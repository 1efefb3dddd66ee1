//! Local input checks run before any auth request leaves the client.

use super::errors::{Field, FormErrors};
use regex::Regex;

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const TOTP_CODE_CHARS: usize = 6;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Returns the message to show under the email field, if any.
#[must_use]
pub fn validate_email(email: &str) -> Option<&'static str> {
    if email.trim().is_empty() {
        Some("Email is required")
    } else if !valid_email(email) {
        Some("Please enter a valid email address")
    } else {
        None
    }
}

/// Returns the message to show under the password field, if any.
#[must_use]
pub fn validate_password(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        Some("Password must be at least 8 characters")
    } else {
        None
    }
}

/// Returns the message to show under the code field, if any.
#[must_use]
pub fn validate_totp_code(code: Option<&str>) -> Option<&'static str> {
    match code {
        Some(code) if code.chars().count() == TOTP_CODE_CHARS => None,
        _ => Some("Please enter the 6-digit code"),
    }
}

/// Checks the primary credentials of a login attempt.
///
/// # Errors
/// Returns every failing field at once.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    if let Some(message) = validate_email(email) {
        errors.insert(Field::Email, message);
    }
    if let Some(message) = validate_password(password) {
        errors.insert(Field::Password, message);
    }
    errors.into_result()
}

/// Checks the code submitted while a second factor is pending.
///
/// # Errors
/// Returns an error tagged to [`Field::TotpCode`].
pub fn validate_second_factor(code: Option<&str>) -> Result<(), FormErrors> {
    match validate_totp_code(code) {
        Some(message) => Err(FormErrors::single(Field::TotpCode, message)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "   ", "plain", "a@b", "@b.com", "a@.com ", "a b@c.com", "a@b c.com"] {
            assert!(validate_email(email).is_some(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn accepts_simple_emails() {
        for email in ["a@b.com", "first.last@sub.example.cz", "x+tag@d.io"] {
            assert_eq!(validate_email(email), None, "{email:?} should be accepted");
        }
    }

    #[test]
    fn empty_email_is_required_not_invalid() {
        assert_eq!(validate_email(""), Some("Email is required"));
    }

    #[test]
    fn password_length_counts_characters() {
        assert_eq!(validate_password(""), Some("Password is required"));
        assert!(validate_password("1234567").is_some());
        assert_eq!(validate_password("12345678"), None);
        assert_eq!(validate_password("ěščřžýáí"), None);
    }

    #[test]
    fn credentials_report_both_fields() {
        let errors = validate_credentials("", "x").expect_err("both fields invalid");
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn second_factor_requires_exactly_six_characters() {
        assert!(validate_second_factor(None).is_err());
        assert!(validate_second_factor(Some("")).is_err());
        assert!(validate_second_factor(Some("12345")).is_err());
        assert!(validate_second_factor(Some("1234567")).is_err());
        assert!(validate_second_factor(Some("123456")).is_ok());

        let errors = validate_second_factor(Some("12")).expect_err("too short");
        assert!(errors.contains(Field::TotpCode));
    }
}
