use super::report::{build_store, print_routes, print_session};
use crate::app_lib::AppConfig;
use anyhow::Result;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
}

/// Prints the cached pre-paint identity, then the session the cookie restores.
///
/// # Errors
/// Returns an error if the client cannot be built.
pub async fn execute(args: Args) -> Result<()> {
    debug!(api = %args.config.api_base_url, "Restoring session");
    let store = build_store(args.config)?;

    match store.cached_user() {
        Some(cached) => println!(
            "cached: {} <{}> role={}",
            cached.name, cached.email, cached.role
        ),
        None => println!("cached: none"),
    }

    store.bootstrap().await;
    let session = store.snapshot();
    print_session(&session);
    print_routes(&session, &[]);

    Ok(())
}
