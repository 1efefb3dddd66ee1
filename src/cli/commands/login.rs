use clap::{Arg, ArgAction, ArgMatches, Command};

pub const CMD_LOGIN: &str = "login";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_REMEMBER_ME: &str = "remember-me";
pub const ARG_TOTP_CODE: &str = "totp-code";
pub const ARG_VISIT: &str = "visit";
pub const ARG_LOGOUT: &str = "logout";

#[derive(Debug, Clone)]
pub struct Options {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    pub totp_code: Option<String>,
    pub visits: Vec<String>,
    pub logout: bool,
}

impl Options {
    /// Parse login arguments from the subcommand matches. Emptiness is left
    /// to the login form checks so the messages match the dashboard.
    ///
    /// # Errors
    /// Returns an error if a required argument is absent.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let email = matches
            .get_one::<String>(ARG_EMAIL)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_EMAIL}"))?;
        let password = matches
            .get_one::<String>(ARG_PASSWORD)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_PASSWORD}"))?;

        Ok(Self {
            email,
            password,
            remember_me: matches.get_flag(ARG_REMEMBER_ME),
            totp_code: matches
                .get_one::<String>(ARG_TOTP_CODE)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
            visits: matches
                .get_many::<String>(ARG_VISIT)
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            logout: matches.get_flag(ARG_LOGOUT),
        })
    }
}

#[must_use]
pub fn command() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in, then resolve routes against the new session")
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long(ARG_EMAIL)
                .help("Account email")
                .env("DASHBOARD_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long(ARG_PASSWORD)
                .help("Account password")
                .env("DASHBOARD_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_REMEMBER_ME)
                .long(ARG_REMEMBER_ME)
                .help("Keep the identity cached across runs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_TOTP_CODE)
                .long(ARG_TOTP_CODE)
                .help("Authenticator code; prompted for when omitted and required"),
        )
        .arg(
            Arg::new(ARG_VISIT)
                .long(ARG_VISIT)
                .help("Route to resolve after signing in (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(ARG_LOGOUT)
                .long(ARG_LOGOUT)
                .help("Sign out before exiting")
                .action(ArgAction::SetTrue),
        )
}
