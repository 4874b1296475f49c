//! Logging setup for `tilde` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `TILDE_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`

use tracing::Level;

/// Environment variable consulted when no level is given on the command line.
pub const LOG_ENV_VAR: &str = "TILDE_LOG";

/// Initialise the global logging subscriber. Logs go to stderr.
///
/// Call once at startup.
pub fn init_logging(cli_level: Option<Level>) {
	let level = cli_level
		.or_else(|| {
			std::env::var(LOG_ENV_VAR)
				.ok()
				.and_then(|s| parse_level_str(&s))
		})
		.unwrap_or(Level::INFO);

	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}

/// Parse a level name, accepting `warning` as an alias for `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
	match s.trim().to_lowercase().as_str() {
		"error" => Some(Level::ERROR),
		"warn" | "warning" => Some(Level::WARN),
		"info" => Some(Level::INFO),
		"debug" => Some(Level::DEBUG),
		"trace" => Some(Level::TRACE),
		_ => None,
	}
}
