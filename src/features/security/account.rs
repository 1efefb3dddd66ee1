//! Second factor enrollment, password and profile changes for the signed-in user.
//! Every operation refuses to run without an identity in the session and
//! re-reads the identity after a success so flags like `totp_enabled` follow.

use super::{
    client::SecurityBackend,
    errors::SecurityError,
    types::{
        ChangePasswordRequest, DisableTotpRequest, MessageResponse, TotpEnrollment,
        TotpSetupResponse, UpdateProfileRequest, VerifyTotpRequest,
    },
};
use crate::features::auth::{
    Field, FormErrors, SessionStore,
    validation::{MIN_PASSWORD_CHARS, validate_second_factor},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

const SETUP_FAILED: &str = "Failed to setup 2FA";
const VERIFY_FAILED: &str = "Invalid verification code";
const DISABLE_FAILED: &str = "Failed to disable 2FA";
const CHANGE_PASSWORD_FAILED: &str = "Failed to change password";
const UPDATE_PROFILE_FAILED: &str = "Failed to update profile";

const TOTP_ENABLED: &str = "Two-factor authentication enabled";
const TOTP_DISABLED: &str = "Two-factor authentication disabled";
const PASSWORD_CHANGED: &str = "Password changed successfully";
const PROFILE_UPDATED: &str = "Profile updated";

pub struct AccountSecurity<B> {
    store: SessionStore<B>,
}

impl<B: SecurityBackend> AccountSecurity<B> {
    #[must_use]
    pub fn new(store: SessionStore<B>) -> Self {
        Self { store }
    }

    /// Starts enrollment and returns the secret to load into an authenticator.
    /// The factor stays inactive until [`AccountSecurity::verify_totp`] succeeds.
    ///
    /// # Errors
    /// See [`SecurityError`].
    #[instrument(skip_all)]
    pub async fn setup_totp(&self) -> Result<TotpEnrollment, SecurityError> {
        self.ensure_signed_in()?;
        let TotpSetupResponse {
            success,
            secret,
            qr_code,
            error,
        } = self.store.backend().setup_totp().await?;

        match secret {
            Some(secret) if success => Ok(TotpEnrollment { secret, qr_code }),
            _ => Err(SecurityError::Rejected(
                error.unwrap_or_else(|| SETUP_FAILED.to_string()),
            )),
        }
    }

    /// Confirms enrollment with a code from the authenticator.
    ///
    /// # Errors
    /// See [`SecurityError`].
    #[instrument(skip_all)]
    pub async fn verify_totp(&self, code: &str) -> Result<String, SecurityError> {
        self.ensure_signed_in()?;
        let code = code.trim();
        validate_second_factor(Some(code))?;

        let response = self
            .store
            .backend()
            .verify_totp(&VerifyTotpRequest { code })
            .await?;
        let message = self.settle(response, TOTP_ENABLED, VERIFY_FAILED).await?;
        info!("Second factor enabled");
        Ok(message)
    }

    /// # Errors
    /// See [`SecurityError`].
    #[instrument(skip_all)]
    pub async fn disable_totp(&self, password: &SecretString) -> Result<String, SecurityError> {
        self.ensure_signed_in()?;
        if password.expose_secret().is_empty() {
            return Err(FormErrors::single(Field::Password, "Password is required").into());
        }

        let response = self
            .store
            .backend()
            .disable_totp(&DisableTotpRequest {
                password: password.expose_secret(),
            })
            .await?;
        let message = self.settle(response, TOTP_DISABLED, DISABLE_FAILED).await?;
        info!("Second factor disabled");
        Ok(message)
    }

    /// # Errors
    /// See [`SecurityError`].
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<String, SecurityError> {
        self.ensure_signed_in()?;
        validate_password_change(
            current.expose_secret(),
            new.expose_secret(),
            confirm.expose_secret(),
        )?;

        let response = self
            .store
            .backend()
            .change_password(&ChangePasswordRequest {
                current_password: current.expose_secret(),
                new_password: new.expose_secret(),
            })
            .await?;
        let message = self
            .settle(response, PASSWORD_CHANGED, CHANGE_PASSWORD_FAILED)
            .await?;
        info!("Password changed");
        Ok(message)
    }

    /// Saves the display name and nickname. An empty nickname clears it.
    ///
    /// # Errors
    /// See [`SecurityError`].
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        name: &str,
        nickname: &str,
    ) -> Result<String, SecurityError> {
        self.ensure_signed_in()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(FormErrors::single(Field::Name, "Name is required").into());
        }

        let response = self
            .store
            .backend()
            .update_profile(&UpdateProfileRequest {
                name,
                nickname: nickname.trim(),
            })
            .await?;
        let message = self
            .settle(response, PROFILE_UPDATED, UPDATE_PROFILE_FAILED)
            .await?;
        info!("Profile updated");
        Ok(message)
    }

    fn ensure_signed_in(&self) -> Result<(), SecurityError> {
        if self.store.snapshot().is_authenticated() {
            Ok(())
        } else {
            Err(SecurityError::NotAuthenticated)
        }
    }

    /// Turns an envelope into the message to show, refreshing the identity on
    /// success.
    async fn settle(
        &self,
        response: MessageResponse,
        succeeded: &str,
        failed: &str,
    ) -> Result<String, SecurityError> {
        if !response.success {
            return Err(SecurityError::Rejected(
                response.error.unwrap_or_else(|| failed.to_string()),
            ));
        }

        if !self.store.refresh().await {
            warn!("Identity refresh after account change failed");
        }
        Ok(response.message.unwrap_or_else(|| succeeded.to_string()))
    }
}

fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    if current.is_empty() {
        errors.insert(Field::CurrentPassword, "Current password is required");
    }
    if new.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(
            Field::NewPassword,
            "Password must be at least 8 characters",
        );
    }
    if new != confirm {
        errors.insert(Field::ConfirmPassword, "Passwords do not match");
    }
    errors.into_result()
}
