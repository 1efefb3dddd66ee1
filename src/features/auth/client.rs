//! Client wrappers for the dashboard auth endpoints. All requests carry the
//! cookie jar. The server sets and clears the session cookie; the client only
//! exports it for the remember-me cache and reinstalls it on the next start.

use super::types::{LoginRequest, LoginResponse, MeResponse};
use crate::app_lib::{ApiClient, AppError};
use std::future::Future;
use tracing::instrument;

/// Backend contract consumed by the session store and the login flow.
pub trait AuthBackend: Send + Sync {
    /// `GET /api/auth/me`: who owns the current session cookie.
    fn fetch_identity(&self) -> impl Future<Output = Result<MeResponse, AppError>> + Send;

    /// `POST /api/auth/login`; the envelope is returned for every status.
    fn login(
        &self,
        request: &LoginRequest<'_>,
    ) -> impl Future<Output = Result<LoginResponse, AppError>> + Send;

    /// `POST /api/auth/logout`; callers treat the result as best effort.
    fn logout(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Session cookies to keep next to the cached identity.
    fn session_cookies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Reinstalls cookies saved by an earlier process.
    fn restore_cookies(&self, _cookies: &[String]) {}
}

/// [`AuthBackend`] over HTTP with a cookie store.
#[derive(Clone, Debug)]
pub struct HttpAuthClient {
    api: ApiClient,
}

impl HttpAuthClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

impl AuthBackend for HttpAuthClient {
    #[instrument(skip_all)]
    async fn fetch_identity(&self) -> Result<MeResponse, AppError> {
        self.api.get_json("auth/me").await
    }

    #[instrument(skip_all)]
    async fn login(&self, request: &LoginRequest<'_>) -> Result<LoginResponse, AppError> {
        self.api.post_json("auth/login", request).await
    }

    #[instrument(skip_all)]
    async fn logout(&self) -> Result<(), AppError> {
        self.api.post_empty("auth/logout").await
    }

    fn session_cookies(&self) -> Vec<String> {
        self.api.session_cookies()
    }

    fn restore_cookies(&self, cookies: &[String]) {
        self.api.restore_cookies(cookies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_lib::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpAuthClient {
        let config = AppConfig {
            api_base_url: server.uri(),
            ..AppConfig::default()
        };
        HttpAuthClient::new(ApiClient::new(config).expect("client should build"))
    }

    #[tokio::test]
    async fn login_sends_code_only_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({
                "email": "a@b.com",
                "password": "password1",
                "totp_code": "123456"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": { "id": "1", "email": "a@b.com", "name": "A", "role": "user" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .login(&LoginRequest {
                email: "a@b.com",
                password: "password1",
                totp_code: Some("123456"),
            })
            .await
            .expect("login response");

        assert!(response.success);
        assert_eq!(response.user.map(|user| user.id), Some("1".to_string()));
    }

    #[tokio::test]
    async fn fetch_identity_fails_on_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_identity().await;
        assert!(matches!(result, Err(AppError::Http { status: 401, .. })));
    }
}
