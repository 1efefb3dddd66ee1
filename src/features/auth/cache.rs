//! Non-authoritative identity cache. A picture-stripped projection of the
//! signed-in user is kept so a restarted client can pre-paint before the
//! session bootstrap resolves. Nothing here decides whether the user is
//! authenticated; the cookie-backed `GET /api/auth/me` does.

use super::types::{CachedUser, User};
use crate::app_lib::AppError;
use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::warn;

/// Fixed key the identity projection is stored under.
pub const USER_DATA_KEY: &str = "user_data";
/// Key the session cookies are saved under, scoped like the projection.
pub const SESSION_COOKIES_KEY: &str = "session_cookies";

/// Key/value storage backend for the identity cache.
pub trait Storage: Send + Sync {
    /// # Errors
    /// Returns `AppError::Storage` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// # Errors
    /// Returns `AppError::Storage` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Durable storage: one JSON file per key under a directory. Survives restarts.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Storage(format!("Failed to read {key}: {err}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            AppError::Storage(format!(
                "Failed to create cache directory {}: {err}",
                self.dir.display()
            ))
        })?;
        // Write then rename so a reader never sees a partial file.
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|err| AppError::Storage(format!("Failed to write {key}: {err}")))?;
        file.write_all(value.as_bytes())
            .map_err(|err| AppError::Storage(format!("Failed to write {key}: {err}")))?;
        file.persist(self.path_for(key))
            .map(drop)
            .map_err(|err| AppError::Storage(format!("Failed to write {key}: {err}")))
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!("Failed to remove {key}: {err}"))),
        }
    }
}

/// Session-scoped storage: lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Session storage lock poisoned".to_string()))?;
        Ok(f(&mut entries))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

/// Identity cache split across a durable and a session-scoped storage.
#[derive(Clone)]
pub struct IdentityCache {
    durable: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
}

impl IdentityCache {
    #[must_use]
    pub fn new(durable: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        Self { durable, session }
    }

    /// Durable files under `dir` plus an in-process session scope.
    #[must_use]
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(
            Arc::new(FileStorage::new(dir)),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Both scopes in memory; nothing survives the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Writes the projection to the durable scope when `remember_me` is set,
    /// otherwise to the session scope, and clears the other scope.
    ///
    /// # Errors
    /// Returns storage or serialization errors.
    pub fn store(&self, user: &User, remember_me: bool) -> Result<(), AppError> {
        let projection = serde_json::to_string(&CachedUser::from(user))
            .map_err(|err| AppError::Serialization(format!("Failed to encode user: {err}")))?;
        self.write_scoped(USER_DATA_KEY, &projection, remember_me)
    }

    /// Keeps the session cookies in the same scope rules as the projection.
    /// An empty list clears both scopes.
    ///
    /// # Errors
    /// Returns storage or serialization errors.
    pub fn store_cookies(&self, cookies: &[String], remember_me: bool) -> Result<(), AppError> {
        if cookies.is_empty() {
            let durable = self.durable.remove(SESSION_COOKIES_KEY);
            let session = self.session.remove(SESSION_COOKIES_KEY);
            return durable.and(session);
        }
        let encoded = serde_json::to_string(cookies)
            .map_err(|err| AppError::Serialization(format!("Failed to encode cookies: {err}")))?;
        self.write_scoped(SESSION_COOKIES_KEY, &encoded, remember_me)
    }

    /// Saved session cookies, durable copy first. Unreadable entries count as none.
    ///
    /// # Errors
    /// Returns storage errors.
    pub fn load_cookies(&self) -> Result<Vec<String>, AppError> {
        let raw = match self.durable.get(SESSION_COOKIES_KEY)? {
            Some(raw) => Some(raw),
            None => self.session.get(SESSION_COOKIES_KEY)?,
        };

        Ok(raw
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(cookies) => Some(cookies),
                Err(err) => {
                    warn!("Ignoring unreadable saved cookies: {err}");
                    None
                }
            })
            .unwrap_or_default())
    }

    fn write_scoped(&self, key: &str, value: &str, remember_me: bool) -> Result<(), AppError> {
        let (target, other) = if remember_me {
            (&self.durable, &self.session)
        } else {
            (&self.session, &self.durable)
        };
        target.set(key, value)?;
        other.remove(key)
    }

    /// Reads the projection, preferring the durable scope. A corrupt entry is
    /// treated as absent.
    ///
    /// # Errors
    /// Returns storage errors.
    pub fn load(&self) -> Result<Option<CachedUser>, AppError> {
        let raw = match self.durable.get(USER_DATA_KEY)? {
            Some(raw) => Some(raw),
            None => self.session.get(USER_DATA_KEY)?,
        };

        Ok(raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Ignoring unreadable cached identity: {err}");
                None
            }
        }))
    }

    /// Whether the current projection lives in the durable scope.
    ///
    /// # Errors
    /// Returns storage errors.
    pub fn is_durable(&self) -> Result<bool, AppError> {
        Ok(self.durable.get(USER_DATA_KEY)?.is_some())
    }

    /// Removes the projection and the cookies from both scopes, attempting
    /// every removal even if one fails.
    ///
    /// # Errors
    /// Returns the first storage error encountered.
    pub fn purge(&self) -> Result<(), AppError> {
        [USER_DATA_KEY, SESSION_COOKIES_KEY]
            .into_iter()
            .flat_map(|key| [self.durable.remove(key), self.session.remove(key)])
            .fold(Ok(()), |acc, removed| acc.and(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::types::Role;

    fn user() -> User {
        User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
            nickname: "ada".to_string(),
            avatar: None,
            profile_picture: Some("data:image/png;base64,AAAA".to_string()),
            role: Role::User,
            totp_enabled: false,
        }
    }

    #[test]
    fn remember_me_writes_durable_scope() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let cache = IdentityCache::new(durable.clone(), session.clone());

        cache.store(&user(), true)?;

        assert!(durable.get(USER_DATA_KEY)?.is_some());
        assert!(session.get(USER_DATA_KEY)?.is_none());
        assert!(cache.is_durable()?);
        Ok(())
    }

    #[test]
    fn session_scope_replaces_durable_copy() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let cache = IdentityCache::new(durable.clone(), session.clone());

        cache.store(&user(), true)?;
        cache.store(&user(), false)?;

        assert!(durable.get(USER_DATA_KEY)?.is_none());
        assert!(session.get(USER_DATA_KEY)?.is_some());
        assert!(!cache.is_durable()?);
        Ok(())
    }

    #[test]
    fn stored_projection_has_no_picture() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        let cache = IdentityCache::new(durable.clone(), Arc::new(MemoryStorage::new()));

        cache.store(&user(), true)?;
        let raw = durable.get(USER_DATA_KEY)?.unwrap_or_default();

        assert!(!raw.contains("profile_picture"));
        assert_eq!(cache.load()?, Some(CachedUser::from(&user())));
        Ok(())
    }

    #[test]
    fn corrupt_entry_loads_as_none() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        durable.set(USER_DATA_KEY, "{not json")?;
        let cache = IdentityCache::new(durable, Arc::new(MemoryStorage::new()));

        assert_eq!(cache.load()?, None);
        Ok(())
    }

    #[test]
    fn purge_clears_both_scopes() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        durable.set(USER_DATA_KEY, "{}")?;
        session.set(USER_DATA_KEY, "{}")?;
        let cache = IdentityCache::new(durable.clone(), session.clone());

        cache.purge()?;

        assert!(durable.get(USER_DATA_KEY)?.is_none());
        assert!(session.get(USER_DATA_KEY)?.is_none());
        Ok(())
    }

    #[test]
    fn cookies_follow_remember_me_and_purge() -> Result<(), AppError> {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let cache = IdentityCache::new(durable.clone(), session.clone());
        let cookies = vec!["auth_token=abc".to_string()];

        cache.store_cookies(&cookies, true)?;
        assert!(durable.get(SESSION_COOKIES_KEY)?.is_some());
        assert_eq!(cache.load_cookies()?, cookies);

        cache.store_cookies(&cookies, false)?;
        assert!(durable.get(SESSION_COOKIES_KEY)?.is_none());
        assert_eq!(cache.load_cookies()?, cookies);

        cache.purge()?;
        assert!(cache.load_cookies()?.is_empty());
        Ok(())
    }

    #[test]
    fn file_storage_round_trips_and_survives_reopen() -> Result<(), AppError> {
        let dir = tempfile::tempdir().map_err(|err| AppError::Storage(err.to_string()))?;
        let cache_dir = dir.path().join("nested");

        IdentityCache::on_disk(&cache_dir).store(&user(), true)?;
        let reopened = IdentityCache::on_disk(&cache_dir);

        assert_eq!(reopened.load()?.map(|cached| cached.id), Some("1".to_string()));
        reopened.purge()?;
        assert_eq!(reopened.load()?, None);
        FileStorage::new(&cache_dir).remove(USER_DATA_KEY)?;
        Ok(())
    }
}
