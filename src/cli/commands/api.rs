use crate::app_lib::{
    Overrides,
    config::{ENV_API_URL, ENV_CACHE_DIR, ENV_TIMEOUT_SECONDS},
};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_CACHE_DIR: &str = "cache-dir";
pub const ARG_TIMEOUT: &str = "timeout";

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub api_url: Option<String>,
    pub cache_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Options {
    /// Parse API client arguments from matches.
    ///
    /// # Errors
    /// Returns an error if `--api-url` is not an absolute http(s) URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let api_url = get_non_empty(ARG_API_URL);
        if let Some(raw) = &api_url {
            let parsed = Url::parse(raw)
                .map_err(|err| anyhow::anyhow!("invalid --{ARG_API_URL} {raw:?}: {err}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("invalid --{ARG_API_URL}: scheme must be http or https");
            }
        }

        Ok(Self {
            api_url,
            cache_dir: get_non_empty(ARG_CACHE_DIR),
            timeout_seconds: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
        })
    }

    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides::new(
            self.api_url.as_deref(),
            self.cache_dir.as_deref(),
            self.timeout_seconds,
        )
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the dashboard backend")
                .env(ENV_API_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CACHE_DIR)
                .long(ARG_CACHE_DIR)
                .help("Directory holding the remembered identity")
                .env(ENV_CACHE_DIR)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env(ENV_TIMEOUT_SECONDS)
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}
