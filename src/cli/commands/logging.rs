use clap::{Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `DASHBOARD_LOG_LEVEL`, indexed by `-v` count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a `-v` count (0 to 5) or a level name from [`LEVEL_NAMES`].
///
/// # Errors
/// Returns a message clap shows next to the flag.
pub fn parse_log_level(value: &str) -> Result<u8, String> {
    if let Ok(count) = value.parse::<u8>()
        && count <= 5
    {
        return Ok(count);
    }

    let name = value.to_ascii_lowercase();
    LEVEL_NAMES
        .iter()
        .position(|level| *level == name)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level `{value}`, expected one of {LEVEL_NAMES:?}"))
}

/// Level the dashboard logs at for a verbosity count; `None` keeps the
/// subscriber default of ERROR.
#[must_use]
pub const fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Session log verbosity, repeat for more or name a level (default: error)")
            .env("DASHBOARD_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(parse_log_level),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_counts_parse() {
        assert_eq!(parse_log_level("DEBUG"), Ok(3));
        assert_eq!(parse_log_level("5"), Ok(5));
        assert!(parse_log_level("6").is_err());
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn counts_map_to_levels() {
        assert_eq!(level_for(0), None);
        assert_eq!(level_for(1), Some(Level::WARN));
        assert_eq!(level_for(3), Some(Level::DEBUG));
        assert_eq!(level_for(9), Some(Level::TRACE));
    }
}
