use crate::error::{Result, TildeError};
use crate::rules::RuleTable;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of running a rule table over a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
	/// Files read.
	pub scanned: usize,

	/// Files whose content the table changed.
	pub changed: usize,

	/// Files written.
	pub written: Vec<PathBuf>,
}

/// Resolve glob patterns relative to `root` into a sorted, de-duplicated file list.
///
/// Directories are skipped. A pattern that matches nothing is not an error.
pub fn expand_globs(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
	let mut files = BTreeSet::new();

	for pattern in patterns {
		let full_pattern = if Path::new(pattern).is_absolute() {
			pattern.clone()
		} else {
			format!(
				"{}/{}",
				glob::Pattern::escape(&root.to_string_lossy()),
				pattern
			)
		};

		let entries = glob::glob(&full_pattern).map_err(|source| TildeError::InvalidGlob {
			pattern: pattern.clone(),
			source,
		})?;

		for entry in entries {
			match entry {
				Ok(path) if path.is_file() => {
					files.insert(path);
				}
				Ok(_) => {}
				Err(err) => warn!("skipping {}: {}", err.path().display(), err.error()),
			}
		}
	}

	Ok(files.into_iter().collect())
}

/// Where rewritten files go instead of back into their sources.
///
/// Each file keeps its path relative to `base` under `dir`, so same-named
/// files in different directories stay apart and relative imports still
/// resolve. Files outside `base` land directly in `dir`.
#[derive(Debug, Clone, Copy)]
pub struct Mirror<'a> {
	pub base: &'a Path,
	pub dir: &'a Path,
}

impl Mirror<'_> {
	pub fn target_for(&self, path: &Path) -> PathBuf {
		match path.strip_prefix(self.base) {
			Ok(rel) => self.dir.join(rel),
			Err(_) => self.dir.join(path.file_name().unwrap_or(path.as_os_str())),
		}
	}
}

/// Apply `table` to one file.
///
/// With a `mirror`, the result is always written to the mirrored path.
/// Otherwise the file is rewritten in place, and only when its content changed.
///
/// Returns whether the content changed and the path written, if any.
pub fn replace_file(
	path: &Path,
	table: &RuleTable,
	mirror: Option<Mirror<'_>>,
) -> Result<(bool, Option<PathBuf>)> {
	let content = std::fs::read_to_string(path).map_err(|source| TildeError::FileReadError {
		path: path.to_path_buf(),
		source,
	})?;

	let rewritten = table.apply(&content);
	let changed = matches!(rewritten, Cow::Owned(ref s) if *s != content);

	let target = match mirror {
		Some(mirror) => {
			let target = mirror.target_for(path);
			if let Some(parent) = target.parent() {
				std::fs::create_dir_all(parent).map_err(|source| TildeError::FileWriteError {
					path: parent.to_path_buf(),
					source,
				})?;
			}
			target
		}
		None if changed => path.to_path_buf(),
		None => return Ok((false, None)),
	};

	std::fs::write(&target, rewritten.as_bytes()).map_err(|source| {
		TildeError::FileWriteError {
			path: target.clone(),
			source,
		}
	})?;

	debug!(
		table = table.kind().as_str(),
		from = %path.display(),
		to = %target.display(),
		changed,
		"wrote file"
	);

	Ok((changed, Some(target)))
}

/// Apply `table` to every file in `files`.
pub fn replace_files(
	files: &[PathBuf],
	table: &RuleTable,
	mirror: Option<Mirror<'_>>,
) -> Result<ReplaceReport> {
	let mut report = ReplaceReport::default();

	for path in files {
		let (changed, written) = replace_file(path, table, mirror)?;
		report.scanned += 1;
		if changed {
			report.changed += 1;
		}
		if let Some(written) = written {
			report.written.push(written);
		}
	}

	Ok(report)
}
