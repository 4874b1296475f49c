use crate::config::parser::parse_config_file;
use crate::config::types::{CompilerSettings, LoadedConfig, Project};
use crate::error::{Result, TildeError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project config file name.
pub const CONFIG_FILE_NAME: &str = "Tildefile.toml";

/// Per-user config file name, looked up in the home directory.
pub const USER_CONFIG_FILE_NAME: &str = ".tilde.toml";

/// Environment variable that, if truthy, skips the user config.
pub const NO_USER_CONFIG_ENV_VAR: &str = "TILDE_NO_USER_CONFIG";

/// Find the nearest `Tildefile.toml`, starting at `start_dir` and walking up.
pub fn find_project_config(start_dir: &Path) -> Option<PathBuf> {
	let mut current_dir = Some(start_dir);

	while let Some(dir) = current_dir {
		let config_path = dir.join(CONFIG_FILE_NAME);
		if config_path.is_file() {
			return Some(config_path);
		}
		current_dir = dir.parent();
	}

	None
}

/// Load the user's ~/.tilde.toml if it exists and isn't disabled.
pub fn load_user_config() -> Result<Option<LoadedConfig>> {
	if is_env_truthy(NO_USER_CONFIG_ENV_VAR) {
		debug!("user config disabled by {}", NO_USER_CONFIG_ENV_VAR);
		return Ok(None);
	}

	let user_config_path = user_config_path()?;

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge compiler settings: project values win over user values, which win over defaults.
pub fn merge_compiler(project: &LoadedConfig, user: Option<&LoadedConfig>) -> CompilerSettings {
	let defaults = CompilerSettings::default();
	let user_compiler = user.map(|loaded| &loaded.config.compiler);

	let binary = project
		.config
		.compiler
		.binary
		.clone()
		.or_else(|| user_compiler.and_then(|c| c.binary.clone()))
		.unwrap_or(defaults.binary);

	let args = project
		.config
		.compiler
		.args
		.clone()
		.or_else(|| user_compiler.and_then(|c| c.args.clone()))
		.unwrap_or(defaults.args);

	CompilerSettings { binary, args }
}

/// Load the project config and the user config, then merge them.
///
/// With `explicit` set, that file is used instead of searching from `start_dir`.
pub fn load_project(start_dir: &Path, explicit: Option<&Path>) -> Result<Project> {
	let config_path = match explicit {
		Some(path) => path.to_path_buf(),
		None => find_project_config(start_dir).ok_or_else(|| TildeError::ConfigNotFound {
			start: start_dir.to_path_buf(),
		})?,
	};

	let config = parse_config_file(&config_path)?;

	let root = match config_path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => start_dir.to_path_buf(),
	};
	let root = root
		.canonicalize()
		.map_err(|source| TildeError::ConfigReadError {
			path: config_path.clone(),
			source,
		})?;

	debug!(path = %config_path.display(), root = %root.display(), "loaded project config");

	let project = LoadedConfig {
		config,
		path: config_path,
	};
	let user = load_user_config()?;
	let compiler = merge_compiler(&project, user.as_ref());

	Ok(Project {
		root,
		project,
		user,
		compiler,
	})
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(TildeError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(USER_CONFIG_FILE_NAME))
}
