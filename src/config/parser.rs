use crate::config::types::Config;
use crate::error::{Result, TildeError};
use std::path::Path;
use tracing::debug;

/// Read, parse and validate a `Tildefile.toml` (or user config) at `path`.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let raw = std::fs::read_to_string(path).map_err(|source| TildeError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	// Editors on Windows like to prepend a byte order mark; toml rejects it.
	let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
	let config = parse_config_str(content, path)?;

	debug!(
		path = %path.display(),
		targets = config.targets.len(),
		custom_preprocess = config.preprocess.is_some(),
		custom_postprocess = config.postprocess.is_some(),
		"loaded config"
	);
	Ok(config)
}

/// Parse and validate config text. `path` only labels errors.
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	toml::from_str::<Config>(content)
		.map_err(|source| TildeError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})
		.and_then(|config| config.validate().map(|()| config))
}
