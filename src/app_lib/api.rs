//! HTTP helpers for the dashboard JSON API with consistent timeouts and error
//! handling. Every request carries the cookie jar so the server-side session
//! (an `HttpOnly` cookie) travels with it; the helpers never read or store the
//! cookie value themselves.

use super::{config::AppConfig, errors::AppError};
use reqwest::{
    Client, Response, Url,
    cookie::{CookieStore, Jar},
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::debug;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Cookie-aware JSON client bound to one API base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
    jar: Arc<Jar>,
    /// `{base}/api/`; `None` when the base is relative and nothing can be scoped.
    cookie_url: Option<Url>,
}

impl ApiClient {
    /// Builds a client with a cookie store and the configured timeout.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout)
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        let cookie_url = Url::parse(&config.api_url("")).ok();

        Ok(Self {
            http,
            config,
            jar,
            cookie_url,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `name=value` pairs the jar would send to the API right now.
    #[must_use]
    pub fn session_cookies(&self) -> Vec<String> {
        let Some(url) = &self.cookie_url else {
            return Vec::new();
        };
        self.jar
            .cookies(url)
            .and_then(|header| header.to_str().ok().map(str::to_owned))
            .map(|header| {
                header
                    .split(';')
                    .map(str::trim)
                    .filter(|pair| pair.contains('='))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Puts previously exported pairs back into the jar, scoped to the API host.
    pub fn restore_cookies(&self, pairs: &[String]) {
        let Some(url) = &self.cookie_url else {
            return;
        };
        for pair in pairs.iter().filter(|pair| pair.contains('=')) {
            self.jar.add_cookie_str(&format!("{pair}; Path=/"), url);
        }
    }

    /// Fetches JSON with cookies; non-success statuses become `AppError::Http`.
    ///
    /// # Errors
    /// Returns transport, HTTP status, or decode errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.config.api_url(path);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    /// Posts JSON with cookies and decodes the response envelope whatever the
    /// status, since the backend reports failures (401, 400) inside the body.
    ///
    /// # Errors
    /// Returns transport errors, or `AppError::Http` when a non-success
    /// response carries no decodable envelope.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.config.api_url(path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_envelope_response(response).await
    }

    /// Puts JSON with cookies and decodes the response envelope.
    ///
    /// # Errors
    /// Same as [`ApiClient::post_json`].
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.config.api_url(path);
        debug!("PUT {url}");
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_envelope_response(response).await
    }

    /// Posts an empty body with cookies and decodes the response envelope.
    ///
    /// # Errors
    /// Same as [`ApiClient::post_json`].
    pub async fn post_empty_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.config.api_url(path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_envelope_response(response).await
    }

    /// Posts an empty body with cookies and ignores any response body.
    ///
    /// # Errors
    /// Returns transport errors or `AppError::Http` for non-success statuses.
    pub async fn post_empty(&self, path: &str) -> Result<(), AppError> {
        let url = self.config.api_url(path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_empty_response(response).await
    }
}

/// Maps transport errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

async fn handle_envelope_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AppError::Network(format!("Failed to read response: {err}")))?;

    match serde_json::from_str::<T>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(AppError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        }),
        Err(err) => Err(AppError::Parse(format!("Failed to decode response: {err}"))),
    }
}

async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

/// Trims and truncates HTTP error bodies before they reach the user.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Envelope {
        success: bool,
        error: Option<String>,
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let config = AppConfig {
            api_base_url: server.uri(),
            request_timeout: Duration::from_secs(5),
            ..AppConfig::default()
        };
        ApiClient::new(config).expect("client should build")
    }

    #[test]
    fn sanitize_body_trims_and_truncates() {
        assert_eq!(sanitize_body("   "), "Request failed.");
        assert_eq!(sanitize_body("  nope  "), "nope");
        assert_eq!(sanitize_body(&"x".repeat(500)).len(), MAX_ERROR_CHARS);
    }

    #[tokio::test]
    async fn post_json_decodes_envelope_on_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "a@b.com" })))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "error": "Invalid email or password"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope: Envelope = client_for(&server)
            .post_json("auth/login", &json!({ "email": "a@b.com" }))
            .await
            .expect("envelope should decode");

        assert_eq!(
            envelope,
            Envelope {
                success: false,
                error: Some("Invalid email or password".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn post_json_without_envelope_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let result: Result<Envelope, AppError> = client_for(&server)
            .post_json("auth/login", &json!({}))
            .await;

        assert_eq!(
            result,
            Err(AppError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn get_json_reports_parse_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result: Result<Envelope, AppError> = client_for(&server).get_json("auth/me").await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn cookies_set_by_the_server_are_sent_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "auth_token=abc; Path=/; HttpOnly")
                    .set_body_json(json!({ "success": true })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(wiremock::matchers::header("cookie", "auth_token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _: Envelope = client
            .post_json("auth/login", &json!({}))
            .await
            .expect("login envelope");
        let me: Envelope = client.get_json("auth/me").await.expect("me envelope");
        assert!(me.success);
    }

    #[tokio::test]
    async fn exported_cookies_reach_a_fresh_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "auth_token=abc; Path=/; HttpOnly")
                    .set_body_json(json!({ "success": true })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(wiremock::matchers::header("cookie", "auth_token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let first = client_for(&server);
        let _: Envelope = first
            .post_json("auth/login", &json!({}))
            .await
            .expect("login envelope");
        let exported = first.session_cookies();
        assert_eq!(exported, vec!["auth_token=abc".to_string()]);

        let second = client_for(&server);
        assert!(second.session_cookies().is_empty());
        second.restore_cookies(&exported);
        let me: Envelope = second.get_json("auth/me").await.expect("me envelope");
        assert!(me.success);
    }

    #[test]
    fn relative_base_exports_nothing() {
        let client = ApiClient::new(AppConfig {
            api_base_url: String::new(),
            ..AppConfig::default()
        })
        .expect("client should build");
        client.restore_cookies(&["auth_token=abc".to_string()]);
        assert!(client.session_cookies().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout: Duration::from_secs(2),
            ..AppConfig::default()
        };
        let client = ApiClient::new(config).expect("client should build");

        let result = client.post_empty("auth/logout").await;
        assert!(matches!(
            result,
            Err(AppError::Network(_) | AppError::Timeout(_))
        ));
    }
}
