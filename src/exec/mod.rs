//! External SASS compiler invocation for tilde.
//!
//! This module handles:
//! - Resolving the compiler binary
//! - Building compiler arguments and environment for a target
//! - Running the compiler with inherited stdio

use crate::config::{CompilerSettings, Target};
use crate::error::{Result, TildeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Build the compiler argument list for a target.
///
/// Layout: `[configured args..., --style=<style>, --cache-location=<dir>?, <input>, <output>]`.
pub fn build_compile_args(settings: &CompilerSettings, target: &Target) -> Vec<String> {
	let mut args = settings.args.clone();

	args.push(format!("--style={}", target.style.as_str()));

	if let Some(ref cache) = target.cache_location {
		args.push(format!("--cache-location={}", cache.to_string_lossy()));
	}

	args.push(target.input.to_string_lossy().to_string());
	args.push(target.output.to_string_lossy().to_string());
	args
}

/// Build environment variables describing the target being compiled.
pub fn build_compile_env(name: &str, target: &Target) -> HashMap<String, String> {
	let mut env = HashMap::new();

	env.insert("TILDE_TARGET".to_string(), name.to_string());
	env.insert(
		"TILDE_INPUT".to_string(),
		target.input.to_string_lossy().to_string(),
	);
	env.insert(
		"TILDE_OUTPUT".to_string(),
		target.output.to_string_lossy().to_string(),
	);
	env.insert(
		"TILDE_STYLE".to_string(),
		target.style.as_str().to_string(),
	);

	if let Some(ref cache) = target.cache_location {
		env.insert(
			"TILDE_CACHE_LOCATION".to_string(),
			cache.to_string_lossy().to_string(),
		);
	}

	env
}

/// Compile a single target, running the compiler in the project root.
pub fn compile_target(
	settings: &CompilerSettings,
	name: &str,
	target: &Target,
	root: &Path,
) -> Result<()> {
	let binary = resolve_command(&settings.binary, root).ok_or_else(|| {
		TildeError::CompilerNotFound {
			command: settings.binary.clone(),
		}
	})?;

	let output_path = root.join(&target.output);
	if let Some(parent) = output_path.parent() {
		std::fs::create_dir_all(parent).map_err(|source| TildeError::FileWriteError {
			path: parent.to_path_buf(),
			source,
		})?;
	}

	let args = build_compile_args(settings, target);
	let env = build_compile_env(name, target);

	debug!(target_name = name, binary = %binary.display(), ?args, "running compiler");

	let mut cmd = Command::new(&binary);
	cmd.args(&args)
		.current_dir(root)
		.stdin(Stdio::null())
		.stdout(Stdio::inherit())
		.stderr(Stdio::inherit())
		.envs(&env);

	let status = cmd.status().map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			TildeError::CompilerNotFound {
				command: binary.to_string_lossy().to_string(),
			}
		} else {
			TildeError::CompilerFailed {
				command: binary.to_string_lossy().to_string(),
				source,
			}
		}
	})?;

	if !status.success() {
		return Err(TildeError::CompilerNonZeroExit {
			target: name.to_string(),
			exit_code: status.code().unwrap_or(-1),
		});
	}

	info!(target_name = name, output = %target.output.display(), "compiled");
	Ok(())
}

/// Resolve a command name to its full path.
///
/// Absolute paths are returned if they exist. Relative paths with a directory
/// component resolve against `root`. Bare names are searched on PATH.
pub fn resolve_command(command: &str, root: &Path) -> Option<PathBuf> {
	let path = Path::new(command);

	if path.is_absolute() {
		return path.exists().then(|| path.to_path_buf());
	}

	if path.components().count() > 1 {
		let full_path = root.join(path);
		return full_path.exists().then_some(full_path);
	}

	// Search PATH
	if let Ok(path_var) = std::env::var("PATH") {
		for dir in std::env::split_paths(&path_var) {
			let full_path = dir.join(command);
			if full_path.is_file() {
				return Some(full_path);
			}
		}
	}

	None
}
