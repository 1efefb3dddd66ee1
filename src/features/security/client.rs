use super::types::{
    ChangePasswordRequest, DisableTotpRequest, MessageResponse, TotpSetupResponse,
    UpdateProfileRequest, VerifyTotpRequest,
};
use crate::app_lib::AppError;
use crate::features::auth::{AuthBackend, HttpAuthClient};
use std::future::Future;
use tracing::instrument;

/// Account security endpoints. Every call rides on the session cookie, so an
/// implementation is always an [`AuthBackend`] too.
pub trait SecurityBackend: AuthBackend {
    fn setup_totp(&self) -> impl Future<Output = Result<TotpSetupResponse, AppError>> + Send;

    fn verify_totp(
        &self,
        request: &VerifyTotpRequest<'_>,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send;

    fn disable_totp(
        &self,
        request: &DisableTotpRequest<'_>,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send;

    fn change_password(
        &self,
        request: &ChangePasswordRequest<'_>,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send;

    fn update_profile(
        &self,
        request: &UpdateProfileRequest<'_>,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send;
}

impl SecurityBackend for HttpAuthClient {
    #[instrument(skip_all)]
    async fn setup_totp(&self) -> Result<TotpSetupResponse, AppError> {
        self.api().post_empty_json("auth/2fa/setup").await
    }

    #[instrument(skip_all)]
    async fn verify_totp(
        &self,
        request: &VerifyTotpRequest<'_>,
    ) -> Result<MessageResponse, AppError> {
        self.api().post_json("auth/2fa/verify", request).await
    }

    #[instrument(skip_all)]
    async fn disable_totp(
        &self,
        request: &DisableTotpRequest<'_>,
    ) -> Result<MessageResponse, AppError> {
        self.api().post_json("auth/2fa/disable", request).await
    }

    #[instrument(skip_all)]
    async fn change_password(
        &self,
        request: &ChangePasswordRequest<'_>,
    ) -> Result<MessageResponse, AppError> {
        self.api().post_json("auth/change-password", request).await
    }

    #[instrument(skip_all)]
    async fn update_profile(
        &self,
        request: &UpdateProfileRequest<'_>,
    ) -> Result<MessageResponse, AppError> {
        self.api().put_json("auth/profile", request).await
    }
}
