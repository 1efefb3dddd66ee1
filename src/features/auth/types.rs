//! Request and response types for the auth endpoints plus the identity record.
//! Login payloads carry passwords and one-time codes, so they deliberately do
//! not implement `Debug` and must never be logged.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Management,
    Team,
    User,
    /// Known to the backend data model but not routed specially.
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Management => "management",
            Role::Team => "team",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity returned by the API for the owner of the session cookie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub totp_enabled: bool,
}

/// Picture-stripped projection of [`User`] kept in the local cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    pub role: Role,
    #[serde(default)]
    pub totp_enabled: bool,
}

impl From<&User> for CachedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            nickname: user.nickname.clone(),
            role: user.role,
            totp_enabled: user.totp_enabled,
        }
    }
}

/// Body of `POST /api/auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_code: Option<&'a str>,
}

/// Envelope returned by `POST /api/auth/login`, on success and on failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<User>,
    pub requires_2fa: Option<bool>,
    pub error: Option<String>,
}

impl LoginResponse {
    #[must_use]
    pub fn requires_second_factor(&self) -> bool {
        self.requires_2fa.unwrap_or(false)
    }
}

/// Envelope returned by `GET /api/auth/me`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<User>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_request_omits_missing_code() {
        let request = LoginRequest {
            email: "a@b.com",
            password: "password1",
            totp_code: None,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value, json!({ "email": "a@b.com", "password": "password1" }));
    }

    #[test]
    fn login_response_tolerates_sparse_envelopes() {
        let response: LoginResponse =
            serde_json::from_value(json!({ "requires_2fa": true })).expect("deserialize");
        assert!(!response.success);
        assert!(response.requires_second_factor());
        assert!(response.user.is_none());
    }

    #[test]
    fn user_role_decodes_admin() {
        let user: User = serde_json::from_value(json!({
            "id": "7",
            "email": "root@b.com",
            "name": "Root",
            "role": "admin"
        }))
        .expect("deserialize");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.nickname, "");
        assert!(!user.totp_enabled);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<User>(json!({
            "id": "7",
            "email": "x@b.com",
            "name": "X",
            "role": "superuser"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn cached_user_drops_pictures() {
        let user = User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
            nickname: "ada".to_string(),
            avatar: Some("https://cdn/avatar.png".to_string()),
            profile_picture: Some("data:image/png;base64,AAAA".to_string()),
            role: Role::Team,
            totp_enabled: true,
        };
        let cached = CachedUser::from(&user);
        let value = serde_json::to_value(&cached).expect("serialize");

        assert!(value.get("profile_picture").is_none());
        assert!(value.get("avatar").is_none());
        assert_eq!(value["role"], "team");
    }
}
