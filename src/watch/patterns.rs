use crate::config::Project;
use crate::error::{Result, TildeError};
use glob::{MatchOptions, Pattern};
use std::fmt;
use std::path::Path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
	case_sensitive: true,
	require_literal_separator: true,
	require_literal_leading_dot: false,
};

/// Compiled watch globs for a single target.
///
/// Patterns are relative to the project root; `matches` takes a relative path
/// with forward slashes, e.g. `"scss/theme.scss"`.
#[derive(Clone)]
pub struct TargetWatchProfile {
	name: String,
	patterns: Vec<Pattern>,
}

impl fmt::Debug for TargetWatchProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TargetWatchProfile")
			.field("name", &self.name)
			.field(
				"patterns",
				&self.patterns.iter().map(Pattern::as_str).collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl TargetWatchProfile {
	pub fn new(name: impl Into<String>, patterns: &[String]) -> Result<Self> {
		let patterns = patterns
			.iter()
			.map(|p| {
				Pattern::new(p).map_err(|source| TildeError::InvalidGlob {
					pattern: p.clone(),
					source,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(TargetWatchProfile {
			name: name.into(),
			patterns,
		})
	}

	/// Name of the target this profile belongs to.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn matches(&self, rel_path: &str) -> bool {
		self.patterns
			.iter()
			.any(|p| p.matches_with(rel_path, MATCH_OPTIONS))
	}
}

/// Build a watch profile for the named target, or for every target.
pub fn build_watch_profiles(
	project: &Project,
	target: Option<&str>,
) -> Result<Vec<TargetWatchProfile>> {
	project
		.select_targets(target)?
		.into_iter()
		.map(|(name, target)| TargetWatchProfile::new(name, &target.watch_patterns()))
		.collect()
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
	let rel = path.strip_prefix(root).ok()?;
	Some(rel.to_string_lossy().replace('\\', "/"))
}
