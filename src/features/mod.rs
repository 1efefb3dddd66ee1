//! Domain-level client features (auth, account security) and their shared
//! logic. The CLI and any presentation layer import these modules so that
//! security and API handling stay in dedicated feature areas.

pub mod auth;
pub mod security;
