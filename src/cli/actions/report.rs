//! Shared wiring and output for the CLI actions. Results go to stdout,
//! prompts and notices to stderr.

use crate::app_lib::{ApiClient, AppConfig};
use crate::features::auth::{HttpAuthClient, IdentityCache, Session, SessionStore};
use crate::routes::{self, paths};
use anyhow::{Context, Result};

pub type Store = SessionStore<HttpAuthClient>;

/// Builds the session store over HTTP with the on-disk identity cache.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn build_store(config: AppConfig) -> Result<Store> {
    let cache = IdentityCache::on_disk(config.cache_dir.clone());
    let api = ApiClient::new(config).context("failed to initialize API client")?;
    Ok(SessionStore::new(HttpAuthClient::new(api), cache))
}

pub fn print_session(session: &Session) {
    match session.user() {
        Some(user) => println!("session: {} <{}> role={}", user.name, user.email, user.role),
        None if session.is_loading() => println!("session: loading"),
        None => println!("session: signed out"),
    }
}

/// Resolves each path against the session; the dashboard when none is given.
pub fn print_routes(session: &Session, visits: &[String]) {
    if visits.is_empty() {
        println!("route {} -> {}", paths::DASHBOARD, routes::resolve(paths::DASHBOARD, session));
    }
    for path in visits {
        println!("route {path} -> {}", routes::resolve(path, session));
    }
}
