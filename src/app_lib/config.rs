//! Client configuration for the dashboard API and the local identity cache.
//! Defaults are compiled in, environment variables override them, and CLI
//! flags override the environment. Configuration values are public; do not
//! store secrets here.

use std::{path::PathBuf, time::Duration};

pub const ENV_API_URL: &str = "DASHBOARD_API_URL";
pub const ENV_CACHE_DIR: &str = "DASHBOARD_CACHE_DIR";
pub const ENV_TIMEOUT_SECONDS: &str = "DASHBOARD_TIMEOUT_SECONDS";

const DEFAULT_API_BASE_URL: &str = "https://panel.socialpreview.cz";
const DEFAULT_CACHE_DIR: &str = ".dashboard-session";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Prefix shared by every REST endpoint of the dashboard backend.
const API_PREFIX: &str = "api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub cache_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl AppConfig {
    /// Loads the defaults and applies environment overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        apply_overrides(&mut config, env_overrides());
        config
    }

    /// Applies overrides coming from an outer layer (CLI flags).
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        apply_overrides(&mut self, overrides);
        self
    }

    /// Builds the absolute URL of an API endpoint, e.g. `auth/me`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        let path = format!("{API_PREFIX}/{}", path.trim().trim_start_matches('/'));
        build_url_with_base(&self.api_base_url, &path)
    }
}

/// Optional values layered over the defaults. Blank strings are ignored.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub cache_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Overrides {
    #[must_use]
    pub fn new(
        api_base_url: Option<&str>,
        cache_dir: Option<&str>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.and_then(normalize_value),
            cache_dir: cache_dir.and_then(normalize_value),
            timeout_seconds: timeout_seconds.filter(|seconds| *seconds > 0),
        }
    }
}

fn env_overrides() -> Overrides {
    let read = |key: &str| std::env::var(key).ok();
    let timeout = read(ENV_TIMEOUT_SECONDS).and_then(|value| value.trim().parse::<u64>().ok());

    Overrides::new(
        read(ENV_API_URL).as_deref(),
        read(ENV_CACHE_DIR).as_deref(),
        timeout,
    )
}

fn apply_overrides(config: &mut AppConfig, overrides: Overrides) {
    if let Some(value) = overrides.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.cache_dir {
        config.cache_dir = PathBuf::from(value);
    }
    if let Some(seconds) = overrides.timeout_seconds {
        config.request_timeout = Duration::from_secs(seconds);
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Joins a base URL and a path. An empty base yields a relative path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        format!("/{}", path.trim_start_matches('/'))
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://panel.example.test "),
            Some("https://panel.example.test".to_string())
        );
    }

    #[test]
    fn overrides_ignore_blank_values_and_zero_timeout() {
        let config = AppConfig::default().with_overrides(Overrides::new(Some(" "), Some(""), Some(0)));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn overrides_replace_values_when_present() {
        let config = AppConfig::default().with_overrides(Overrides::new(
            Some("http://localhost:3000"),
            Some("/tmp/dashboard"),
            Some(3),
        ));

        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/dashboard"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn load_reads_environment() {
        temp_env::with_vars(
            [
                (ENV_API_URL, Some("http://127.0.0.1:8080/")),
                (ENV_CACHE_DIR, None),
                (ENV_TIMEOUT_SECONDS, Some("not-a-number")),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, "http://127.0.0.1:8080/");
                assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
                assert_eq!(
                    config.request_timeout,
                    Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
                );
            },
        );
    }

    #[test]
    fn api_url_joins_prefix_and_path() {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:8080/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.api_url("/auth/me"), "http://127.0.0.1:8080/api/auth/me");
        assert_eq!(config.api_url("auth/login"), "http://127.0.0.1:8080/api/auth/login");
    }

    #[test]
    fn api_url_with_empty_base_is_relative() {
        let config = AppConfig {
            api_base_url: String::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.api_url("auth/me"), "/api/auth/me");
    }
}
