use std::path::PathBuf;

/// Library-level structured errors for tilde.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum TildeError {
	#[error("No Tildefile.toml found in {start} or any parent directory")]
	ConfigNotFound { start: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid regex pattern in rule: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid glob pattern: {pattern}")]
	InvalidGlob {
		pattern: String,
		#[source]
		source: glob::PatternError,
	},

	#[error("Unknown target: {name}")]
	UnknownTarget { name: String },

	#[error("Invalid target {name}: {reason}")]
	InvalidTarget { name: String, reason: String },

	#[error("Failed to read file: {path}")]
	FileReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write file: {path}")]
	FileWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to remove: {path}")]
	RemoveError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Path escapes the project root: {path}")]
	PathEscapesRoot { path: PathBuf },

	#[error("Compiler not found: {command}")]
	CompilerNotFound { command: String },

	#[error("Compiler execution failed: {command}")]
	CompilerFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Compiler returned non-zero exit code for target {target} (exit code: {exit_code})")]
	CompilerNonZeroExit { target: String, exit_code: i32 },

	#[error("File watcher error")]
	WatchError(#[from] notify::Error),

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using TildeError.
pub type Result<T> = std::result::Result<T, TildeError>;
