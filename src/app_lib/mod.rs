//! Shared client utilities for API access, configuration, and errors.
//!
//! ## Session model
//!
//! The dashboard backend keeps the session in an `HttpOnly` cookie set by
//! `POST /api/auth/login` and cleared by `POST /api/auth/logout`. The client
//! never handles a token: it only keeps a cookie jar and asks
//! `GET /api/auth/me` who the cookie belongs to.
//!
//! Centralizing these helpers keeps network behavior consistent and avoids
//! duplicated request setup in the auth and security features. Callers must
//! still avoid logging passwords or one-time codes.

pub mod api;
pub mod config;
pub mod errors;

pub use api::ApiClient;
pub use config::{AppConfig, Overrides};
pub use errors::AppError;
