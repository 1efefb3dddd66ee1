//! Auth session state for the client. The store bootstraps the session once
//! from the cookie-backed `GET /api/auth/me` and is the only place that
//! mutates it afterwards (install, logout, refresh). Consumers receive the
//! store by injection and observe changes through a `watch` channel.

use super::{
    cache::IdentityCache,
    client::AuthBackend,
    types::{CachedUser, MeResponse, Role, User},
};
use crate::app_lib::AppError;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Snapshot of the session. Authentication is derived from `user` alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    is_loading: bool,
}

impl Session {
    /// State at process start, before the bootstrap resolves.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    #[must_use]
    pub const fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }
}

struct Inner<B> {
    backend: B,
    cache: IdentityCache,
    state: watch::Sender<Session>,
    bootstrapped: AtomicBool,
    /// Bumped by every login and logout, inside the state lock.
    generation: AtomicU64,
}

/// Why `GET /api/auth/me` did not yield an identity.
#[derive(Debug)]
enum IdentityLookupError {
    Transport(AppError),
    NotAuthenticated(Option<String>),
}

impl fmt::Display for IdentityLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityLookupError::Transport(err) => write!(f, "{err}"),
            IdentityLookupError::NotAuthenticated(Some(message)) => {
                write!(f, "not authenticated: {message}")
            }
            IdentityLookupError::NotAuthenticated(None) => f.write_str("not authenticated"),
        }
    }
}

/// Process-wide session store. Cloning shares the same session.
pub struct SessionStore<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for SessionStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: AuthBackend> SessionStore<B> {
    /// Creates a store in the loading state. Call [`SessionStore::bootstrap`] next.
    #[must_use]
    pub fn new(backend: B, cache: IdentityCache) -> Self {
        let (state, _) = watch::channel(Session::loading());
        Self {
            inner: Arc::new(Inner {
                backend,
                cache,
                state,
                bootstrapped: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Cached projection for pre-painting; never an authentication signal.
    #[must_use]
    pub fn cached_user(&self) -> Option<CachedUser> {
        self.inner.cache.load().unwrap_or_else(|err| {
            warn!("Failed to read cached identity: {err}");
            None
        })
    }

    /// Resolves the session from the cookie once per process. Any failure
    /// leaves the user signed out and purges the cache. Later calls are no-ops.
    ///
    /// If a login or logout lands while the lookup is in flight, its outcome
    /// stands and the lookup result is dropped; loading still ends.
    #[instrument(skip_all)]
    pub async fn bootstrap(&self) {
        if self.inner.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("Session already bootstrapped");
            return;
        }

        match self.inner.cache.load_cookies() {
            Ok(cookies) if !cookies.is_empty() => self.inner.backend.restore_cookies(&cookies),
            Ok(_) => {}
            Err(err) => warn!("Failed to read saved cookies: {err}"),
        }

        let seen = self.generation();
        let lookup = self.lookup_identity().await;

        let mut current = false;
        self.inner.state.send_if_modified(|session| {
            let was_loading = std::mem::replace(&mut session.is_loading, false);
            if self.generation() != seen {
                return was_loading;
            }
            current = true;
            let user = lookup.as_ref().ok().cloned();
            let changed = session.user != user;
            session.user = user;
            was_loading || changed
        });

        if !current {
            debug!("Bootstrap result dropped, session changed while it ran");
            return;
        }

        match lookup {
            Ok(user) => {
                let remember_me = self.inner.cache.is_durable().unwrap_or(false);
                self.mirror(&user, remember_me);
                info!(role = %user.role, "Session restored");
            }
            Err(err) => {
                debug!("No valid session: {err}");
                self.purge_cache();
            }
        }
    }

    /// Installs an identity obtained from a successful login round trip. Also
    /// ends loading, so a login that beats the bootstrap is final.
    pub fn login(&self, user: User, remember_me: bool) {
        info!(role = %user.role, "Signed in");
        let cached = user.clone();
        self.inner.state.send_modify(|session| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            session.user = Some(user);
            session.is_loading = false;
        });
        self.mirror(&cached, remember_me);
    }

    /// Clears the identity and the cache, then notifies the server. A failed
    /// notification does not undo the local sign-out.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        self.inner.state.send_modify(|session| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            session.user = None;
            session.is_loading = false;
        });
        self.purge_cache();

        if let Err(err) = self.inner.backend.logout().await {
            warn!("Server logout failed, local session cleared anyway: {err}");
        }
        info!("Signed out");
    }

    /// Re-reads the identity. Only a successful lookup changes anything; a
    /// failure keeps the current session. A lookup overtaken by a login or
    /// logout is dropped. Returns whether the result was applied.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> bool {
        let seen = self.generation();
        let user = match self.lookup_identity().await {
            Ok(user) => user,
            Err(err) => {
                warn!("Identity refresh failed, keeping current session: {err}");
                return false;
            }
        };

        let mut current = false;
        self.inner.state.send_if_modified(|session| {
            if self.generation() != seen {
                return false;
            }
            current = true;
            if session.user.as_ref() == Some(&user) {
                false
            } else {
                session.user = Some(user.clone());
                true
            }
        });

        if !current {
            debug!("Refresh result dropped, session changed while it ran");
            return false;
        }

        let remember_me = self.inner.cache.is_durable().unwrap_or(false);
        self.mirror(&user, remember_me);
        true
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    async fn lookup_identity(&self) -> Result<User, IdentityLookupError> {
        let MeResponse {
            success,
            user,
            error,
        } = self
            .inner
            .backend
            .fetch_identity()
            .await
            .map_err(IdentityLookupError::Transport)?;

        match user {
            Some(user) if success => Ok(user),
            _ => Err(IdentityLookupError::NotAuthenticated(error)),
        }
    }

    fn mirror(&self, user: &User, remember_me: bool) {
        if let Err(err) = self.inner.cache.store(user, remember_me) {
            warn!("Failed to cache identity: {err}");
        }
        let cookies = self.inner.backend.session_cookies();
        if let Err(err) = self.inner.cache.store_cookies(&cookies, remember_me) {
            warn!("Failed to save session cookies: {err}");
        }
    }

    fn purge_cache(&self) {
        if let Err(err) = self.inner.cache.purge() {
            warn!("Failed to purge cached identity: {err}");
        }
    }
}
