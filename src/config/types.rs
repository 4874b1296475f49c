use crate::error::{Result, TildeError};
use crate::rules::{RuleSpec, RuleTable, TableKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default compiler binary, looked up on PATH.
pub const DEFAULT_COMPILER: &str = "sass";

/// Default debounce window for the watch loop.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Top-level configuration from a `Tildefile.toml` (or `~/.tilde.toml`) file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// External SASS compiler settings.
	#[serde(default)]
	pub compiler: CompilerConfig,

	/// Paths removed by `tilde clean`.
	#[serde(default)]
	pub clean: CleanConfig,

	/// Watch loop settings.
	#[serde(default)]
	pub watch: WatchConfig,

	/// Compile targets keyed by name.
	#[serde(default)]
	pub targets: BTreeMap<String, Target>,

	/// Custom preprocess rules. Replaces the built-in table when present.
	#[serde(default)]
	pub preprocess: Option<Vec<RuleSpec>>,

	/// Custom postprocess rules. Replaces the built-in table when present.
	#[serde(default)]
	pub postprocess: Option<Vec<RuleSpec>>,
}

/// `[compiler]` section. Unset fields fall back to the user config, then to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompilerConfig {
	/// Compiler binary name or path.
	pub binary: Option<String>,

	/// Extra arguments placed before the generated ones.
	pub args: Option<Vec<String>>,
}

/// `[clean]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CleanConfig {
	/// Files or directories to remove, relative to the project root.
	#[serde(default = "default_clean_paths")]
	pub paths: Vec<PathBuf>,
}

impl Default for CleanConfig {
	fn default() -> Self {
		CleanConfig {
			paths: default_clean_paths(),
		}
	}
}

fn default_clean_paths() -> Vec<PathBuf> {
	vec![PathBuf::from(".sass-cache")]
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatchConfig {
	/// How long to keep collecting events before running the pipeline.
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
}

impl Default for WatchConfig {
	fn default() -> Self {
		WatchConfig {
			debounce_ms: DEFAULT_DEBOUNCE_MS,
		}
	}
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}

/// Output style passed to the compiler as `--style`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
	Nested,
	#[default]
	Expanded,
	Compact,
	Compressed,
}

impl OutputStyle {
	pub fn as_str(&self) -> &'static str {
		match self {
			OutputStyle::Nested => "nested",
			OutputStyle::Expanded => "expanded",
			OutputStyle::Compact => "compact",
			OutputStyle::Compressed => "compressed",
		}
	}
}

/// A named compile unit (`[targets.<name>]`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Target {
	/// Stylesheet entry point handed to the compiler.
	pub input: PathBuf,

	/// CSS file the compiler writes.
	pub output: PathBuf,

	#[serde(default)]
	pub style: OutputStyle,

	/// Compiler cache directory. Also removed by `tilde clean`.
	pub cache_location: Option<PathBuf>,

	/// Globs of source files to expand shorthand in before compiling.
	#[serde(default)]
	pub preprocess: Vec<String>,

	/// Write preprocessed files here instead of in place.
	pub preprocess_dest: Option<PathBuf>,

	/// Globs of files to restore shorthand in after compiling.
	#[serde(default)]
	pub postprocess: Vec<String>,

	/// Globs that trigger a rebuild in `tilde watch`.
	/// Defaults to the preprocess globs plus the input file.
	pub watch: Option<Vec<String>>,
}

impl Target {
	/// Effective watch globs.
	pub fn watch_patterns(&self) -> Vec<String> {
		if let Some(ref watch) = self.watch {
			return watch.clone();
		}

		let mut patterns = self.preprocess.clone();
		let input = self.input.to_string_lossy().replace('\\', "/");
		if !patterns.contains(&input) {
			patterns.push(input);
		}
		patterns
	}

	/// Check that the required paths are present.
	pub fn validate(&self, name: &str) -> Result<()> {
		if name.trim().is_empty() {
			return Err(TildeError::InvalidTarget {
				name: name.to_string(),
				reason: "target name is empty".to_string(),
			});
		}

		for (field, value) in [("input", &self.input), ("output", &self.output)] {
			if value.as_os_str().is_empty() {
				return Err(TildeError::InvalidTarget {
					name: name.to_string(),
					reason: format!("missing `{}`", field),
				});
			}
		}

		Ok(())
	}
}

impl Config {
	/// Validate targets and custom rule tables.
	pub fn validate(&self) -> Result<()> {
		for (name, target) in &self.targets {
			target.validate(name)?;
		}

		if let Some(ref specs) = self.preprocess {
			RuleTable::compile(TableKind::Preprocess, specs)?;
		}
		if let Some(ref specs) = self.postprocess {
			RuleTable::compile(TableKind::Postprocess, specs)?;
		}

		Ok(())
	}

	/// Custom rule specs for `kind`, if the config declares any.
	pub fn rule_specs(&self, kind: TableKind) -> Option<&[RuleSpec]> {
		match kind {
			TableKind::Preprocess => self.preprocess.as_deref(),
			TableKind::Postprocess => self.postprocess.as_deref(),
		}
	}
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Compiler settings after merging project, user, and default values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
	pub binary: String,
	pub args: Vec<String>,
}

impl Default for CompilerSettings {
	fn default() -> Self {
		CompilerSettings {
			binary: DEFAULT_COMPILER.to_string(),
			args: Vec::new(),
		}
	}
}

/// The effective configuration of a project.
#[derive(Debug, Clone)]
pub struct Project {
	/// Directory containing the project config; all relative paths resolve here.
	pub root: PathBuf,

	/// The project config file.
	pub project: LoadedConfig,

	/// The user config file, when one was loaded.
	pub user: Option<LoadedConfig>,

	/// Merged compiler settings.
	pub compiler: CompilerSettings,
}

impl Project {
	pub fn config(&self) -> &Config {
		&self.project.config
	}

	/// Look up a target by name.
	pub fn target(&self, name: &str) -> Result<&Target> {
		self.config()
			.targets
			.get(name)
			.ok_or_else(|| TildeError::UnknownTarget {
				name: name.to_string(),
			})
	}

	/// The named target, or every target in name order.
	pub fn select_targets(&self, name: Option<&str>) -> Result<Vec<(&str, &Target)>> {
		match name {
			Some(name) => {
				let (name, target) = self.config().targets.get_key_value(name).ok_or_else(|| {
					TildeError::UnknownTarget {
						name: name.to_string(),
					}
				})?;
				Ok(vec![(name.as_str(), target)])
			}
			None => Ok(self
				.config()
				.targets
				.iter()
				.map(|(name, target)| (name.as_str(), target))
				.collect()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn target(input: &str, output: &str) -> Target {
		Target {
			input: PathBuf::from(input),
			output: PathBuf::from(output),
			..Default::default()
		}
	}

	#[test]
	fn test_watch_patterns_default_to_preprocess_and_input() {
		let mut t = target("scss/main.scss", "css/main.css");
		t.preprocess = vec!["scss/**/*.scss".to_string()];
		assert_eq!(
			t.watch_patterns(),
			vec!["scss/**/*.scss".to_string(), "scss/main.scss".to_string()]
		);
	}

	#[test]
	fn test_watch_patterns_explicit() {
		let mut t = target("scss/main.scss", "css/main.css");
		t.preprocess = vec!["scss/**/*.scss".to_string()];
		t.watch = Some(vec!["theme/*.scss".to_string()]);
		assert_eq!(t.watch_patterns(), vec!["theme/*.scss".to_string()]);
	}

	#[test]
	fn test_target_validate_missing_output() {
		let t = target("main.scss", "");
		match t.validate("theme").unwrap_err() {
			TildeError::InvalidTarget { name, reason } => {
				assert_eq!(name, "theme");
				assert!(reason.contains("output"));
			}
			_ => panic!("Expected InvalidTarget error"),
		}
	}

	#[test]
	fn test_target_validate_empty_name() {
		let t = target("main.scss", "main.css");
		assert!(t.validate(" ").is_err());
		assert!(t.validate("theme").is_ok());
	}

	#[test]
	fn test_output_style_as_str() {
		assert_eq!(OutputStyle::default().as_str(), "expanded");
		assert_eq!(OutputStyle::Compressed.as_str(), "compressed");
		assert_eq!(OutputStyle::Compact.as_str(), "compact");
		assert_eq!(OutputStyle::Nested.as_str(), "nested");
	}

	#[test]
	fn test_clean_config_default() {
		assert_eq!(
			CleanConfig::default().paths,
			vec![PathBuf::from(".sass-cache")]
		);
	}
}
