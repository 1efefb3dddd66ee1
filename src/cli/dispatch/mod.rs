//! Command-line argument dispatch.
//!
//! Parses validated CLI arguments, layers them over the environment and the
//! compiled-in defaults, and maps the subcommand to an action.

use crate::app_lib::AppConfig;
use crate::cli::actions::{Action, login, whoami};
use crate::cli::commands::{CMD_WHOAMI, api, login::CMD_LOGIN, login::Options as LoginOptions};
use anyhow::Result;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_opts = api::Options::parse(matches)?;
    let config = AppConfig::load().with_overrides(api_opts.overrides());

    match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => {
            let opts = LoginOptions::parse(sub)?;
            Ok(Action::Login(login::Args {
                config,
                email: opts.email,
                password: opts.password.into(),
                remember_me: opts.remember_me,
                totp_code: opts.totp_code,
                visits: opts.visits,
                logout: opts.logout,
            }))
        }
        Some((CMD_WHOAMI, _)) => Ok(Action::Whoami(whoami::Args { config })),
        Some((other, _)) => anyhow::bail!("unknown command: {other}"),
        None => anyhow::bail!("missing command"),
    }
}
