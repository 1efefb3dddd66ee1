//! Account settings for a signed-in user: TOTP enrollment and removal,
//! password changes and profile edits. Operations go through the same cookie-carrying client
//! as the auth feature and never log secrets or codes.

pub mod account;
pub mod client;
pub mod errors;
pub mod types;

pub use account::AccountSecurity;
pub use client::SecurityBackend;
pub use errors::SecurityError;
pub use types::TotpEnrollment;
