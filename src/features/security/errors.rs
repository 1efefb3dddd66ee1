use crate::app_lib::AppError;
use crate::features::auth::{Field, FormErrors, errors::NETWORK_ERROR_MESSAGE};
use thiserror::Error;

pub const SIGN_IN_REQUIRED_MESSAGE: &str = "Please sign in again";

/// Failure of an account security operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// No identity in the session; nothing was sent.
    #[error("not signed in")]
    NotAuthenticated,
    #[error("invalid input: {0}")]
    Validation(FormErrors),
    #[error("{0}")]
    Rejected(String),
    #[error("network failure: {0}")]
    Network(AppError),
}

impl SecurityError {
    #[must_use]
    pub fn into_form_errors(self) -> FormErrors {
        match self {
            SecurityError::NotAuthenticated => {
                FormErrors::single(Field::General, SIGN_IN_REQUIRED_MESSAGE)
            }
            SecurityError::Validation(errors) => errors,
            SecurityError::Rejected(message) => FormErrors::single(Field::General, message),
            SecurityError::Network(_) => FormErrors::single(Field::General, NETWORK_ERROR_MESSAGE),
        }
    }
}

impl From<FormErrors> for SecurityError {
    fn from(errors: FormErrors) -> Self {
        SecurityError::Validation(errors)
    }
}

impl From<AppError> for SecurityError {
    fn from(err: AppError) -> Self {
        SecurityError::Network(err)
    }
}
