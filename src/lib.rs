//! # Dashboard Session (auth lifecycle client)
//!
//! `dashboard-session` owns the client-side session of the role-based
//! dashboard: the one-time bootstrap from the session cookie, credential login
//! with the optional TOTP continuation, the role route guard, and the session
//! mutation API (install, logout, refresh).
//!
//! ## Session Model
//!
//! The server keeps the session in an `HttpOnly` cookie. The client only holds
//! a cookie jar and a process-wide [`features::auth::SessionStore`]; an
//! identity is considered authenticated only after `GET /api/auth/me` or a
//! successful login confirmed it. A cached projection of the user is kept for
//! pre-painting and is never an authentication signal.
//!
//! ## Routing
//!
//! `/dashboard` is the single guarded destination. Management and team members
//! get the team dashboard, plain users the user dashboard; every other path
//! falls back to `/login`. Guards are UX only; the API enforces access.

pub mod app_lib;
pub mod cli;
pub mod features;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
