//! Wire types for the account security endpoints.

use serde::{Deserialize, Serialize};

/// Answer of `POST /api/auth/2fa/setup`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TotpSetupResponse {
    #[serde(default)]
    pub success: bool,
    pub secret: Option<String>,
    /// Data URL of the provisioning QR code.
    pub qr_code: Option<String>,
    pub error: Option<String>,
}

/// Envelope shared by verify, disable, change-password and profile updates.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyTotpRequest<'a> {
    pub code: &'a str,
}

#[derive(Serialize)]
pub struct DisableTotpRequest<'a> {
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Body of `PUT /api/auth/profile`.
#[derive(Serialize)]
pub struct UpdateProfileRequest<'a> {
    pub name: &'a str,
    pub nickname: &'a str,
}

/// Enrollment material handed to the user after a successful setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TotpEnrollment {
    pub secret: String,
    pub qr_code: Option<String>,
}
