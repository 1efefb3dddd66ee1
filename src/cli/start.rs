use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Parses the dashboard-session command line, starts logging at the
/// requested verbosity and resolves the `login` or `whoami` action to run.
///
/// # Errors
///
/// Fails on an invalid command line, a logging subscriber that cannot be
/// installed, or options that do not form a usable dashboard config.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or_default();
    telemetry::init(commands::logging::level_for(verbosity))?;

    dispatch::handler(&matches)
}
