//! Auth feature covering the session bootstrap, credential login with the
//! TOTP continuation, and role-based route gating. It keeps authentication
//! logic out of the presentation layer and must stay aligned with the backend
//! contract. This module touches security boundaries and must avoid logging
//! passwords, one-time codes, or cookies.
//!
//! Flow Overview: the store bootstraps once from `GET /api/auth/me`. Login
//! posts credentials to `POST /api/auth/login`; a `requires_2fa` answer keeps
//! the credentials and waits for a code, a success installs the identity.
//! Logout clears local state first and then notifies `POST /api/auth/logout`.

pub mod cache;
pub mod client;
pub mod errors;
pub mod flow;
mod guards;
pub mod state;
pub mod types;
pub mod validation;

pub use cache::{FileStorage, IdentityCache, MemoryStorage, Storage};
pub use client::{AuthBackend, HttpAuthClient};
pub use errors::{Field, FormErrors, LoginError};
pub use flow::{Liveness, LoginAttempt, LoginFlow, LoginOutcome, LoginStage};
pub use guards::{GuardDecision, require_auth};
pub use state::{Session, SessionStore};
pub use types::{CachedUser, Role, User};
