//! Credential login with the optional TOTP continuation.
//!
//! The flow is a two-stage state machine. In [`LoginStage::Credentials`] the
//! email and password are validated locally and submitted. When the server
//! answers `requires_2fa`, the flow moves to [`LoginStage::SecondFactor`] and
//! keeps the already validated credentials, so later submissions only carry a
//! new code. Only an explicit [`LoginFlow::reset`] goes back to the first
//! stage; a wrong code keeps the flow waiting for another one.
//!
//! Passwords are held as `SecretString` and are never logged.

use super::{
    client::AuthBackend,
    errors::{LOGIN_FAILED_MESSAGE, LoginError},
    state::SessionStore,
    types::{LoginRequest, LoginResponse},
    validation::{validate_credentials, validate_second_factor},
};
use crate::routes::paths;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, instrument, warn};

/// Notice shown when the server first asks for a second factor.
pub const SECOND_FACTOR_PROMPT: &str = "Enter the 6-digit code from your authenticator app";

/// One submission of the login form.
pub struct LoginAttempt {
    pub email: String,
    pub password: SecretString,
    pub remember_me: bool,
    pub totp_code: Option<String>,
}

impl LoginAttempt {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
            remember_me: false,
            totp_code: None,
        }
    }

    #[must_use]
    pub fn remember_me(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }

    #[must_use]
    pub fn totp_code(mut self, code: impl Into<String>) -> Self {
        self.totp_code = Some(code.into());
        self
    }

    /// The code to send, if the user typed anything other than blanks.
    fn submitted_code(&self) -> Option<&str> {
        self.totp_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }
}

pub enum LoginStage {
    Credentials,
    SecondFactor {
        email: String,
        password: SecretString,
    },
}

impl LoginStage {
    #[must_use]
    pub const fn is_second_factor(&self) -> bool {
        matches!(self, LoginStage::SecondFactor { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session is installed; navigate to `landing`.
    Authenticated { landing: &'static str },
    /// Ask for a code; `notice` explains why (first prompt or wrong code).
    SecondFactorRequired { notice: String },
    /// The consumer went away while the request was in flight; nothing changed.
    Discarded,
}

/// Handle a consumer uses to mark itself gone while a request is pending.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct LoginFlow<B> {
    store: SessionStore<B>,
    stage: LoginStage,
    liveness: Liveness,
}

impl<B: AuthBackend> LoginFlow<B> {
    #[must_use]
    pub fn new(store: SessionStore<B>) -> Self {
        Self {
            store,
            stage: LoginStage::Credentials,
            liveness: Liveness(Arc::new(AtomicBool::new(true))),
        }
    }

    #[must_use]
    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    #[must_use]
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Drops any retained credentials and returns to the first stage.
    pub fn reset(&mut self) {
        if self.stage.is_second_factor() {
            debug!("Login flow reset, retained credentials dropped");
        }
        self.stage = LoginStage::Credentials;
    }

    /// Validates and submits one attempt.
    ///
    /// While a second factor is pending, the attempt's email and password are
    /// ignored and only its code is used.
    ///
    /// # Errors
    /// Returns [`LoginError::Validation`] without any request when local checks
    /// fail, [`LoginError::Rejected`] when the server refuses the login, and
    /// [`LoginError::Network`] when the request cannot complete.
    #[instrument(skip_all, fields(second_factor = self.stage.is_second_factor()))]
    pub async fn login(&mut self, attempt: LoginAttempt) -> Result<LoginOutcome, LoginError> {
        let response = match &self.stage {
            LoginStage::Credentials => {
                validate_credentials(&attempt.email, attempt.password.expose_secret())?;
                self.submit(
                    &attempt.email,
                    &attempt.password,
                    attempt.submitted_code(),
                )
                .await
            }
            LoginStage::SecondFactor { email, password } => {
                validate_second_factor(attempt.totp_code.as_deref())?;
                self.submit(email, password, attempt.submitted_code()).await
            }
        };

        if !self.liveness.is_alive() {
            debug!("Login result discarded, consumer is gone");
            return Ok(LoginOutcome::Discarded);
        }

        let response = response.map_err(|err| {
            warn!("Login request failed: {err}");
            LoginError::Network(err)
        })?;

        self.interpret(response, attempt)
    }

    /// Convenience for resubmitting while a second factor is pending.
    ///
    /// # Errors
    /// Same as [`LoginFlow::login`].
    pub async fn submit_code(
        &mut self,
        code: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, LoginError> {
        let attempt = LoginAttempt::new(String::new(), SecretString::from(String::new()))
            .remember_me(remember_me)
            .totp_code(code);
        self.login(attempt).await
    }

    async fn submit(
        &self,
        email: &str,
        password: &SecretString,
        totp_code: Option<&str>,
    ) -> Result<LoginResponse, crate::app_lib::AppError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
            totp_code,
        };
        self.store.backend().login(&request).await
    }

    fn interpret(
        &mut self,
        response: LoginResponse,
        attempt: LoginAttempt,
    ) -> Result<LoginOutcome, LoginError> {
        if response.requires_second_factor() {
            let notice = response
                .error
                .unwrap_or_else(|| SECOND_FACTOR_PROMPT.to_string());
            if !self.stage.is_second_factor() {
                info!("Second factor required");
                self.stage = LoginStage::SecondFactor {
                    email: attempt.email,
                    password: attempt.password,
                };
            }
            return Ok(LoginOutcome::SecondFactorRequired { notice });
        }

        match response.user {
            Some(user) if response.success => {
                self.stage = LoginStage::Credentials;
                self.store.login(user, attempt.remember_me);
                Ok(LoginOutcome::Authenticated {
                    landing: paths::DASHBOARD,
                })
            }
            _ => {
                let message = response
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
                debug!("Login rejected");
                Err(LoginError::Rejected(message))
            }
        }
    }
}
