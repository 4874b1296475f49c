use crate::config::Project;
use crate::error::{Result, TildeError};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Everything `tilde clean` removes: `[clean] paths` plus each target's cache location.
pub fn clean_paths(project: &Project) -> Vec<PathBuf> {
	let config = project.config();
	let mut paths = config.clean.paths.clone();

	for target in config.targets.values() {
		if let Some(ref cache) = target.cache_location
			&& !paths.contains(cache)
		{
			paths.push(cache.clone());
		}
	}

	paths
}

/// Resolve `path` against `root`, refusing anything outside it.
fn resolve_inside_root(root: &Path, path: &Path) -> Result<PathBuf> {
	let escapes = path
		.components()
		.any(|c| matches!(c, Component::ParentDir));

	let full_path = root.join(path);
	if escapes || !full_path.starts_with(root) || full_path == root {
		return Err(TildeError::PathEscapesRoot {
			path: path.to_path_buf(),
		});
	}

	Ok(full_path)
}

/// Remove `paths` (relative to `root`). Missing paths are skipped.
///
/// Returns the paths that were removed.
pub fn clean(root: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
	let mut removed = Vec::new();

	for path in paths {
		let full_path = resolve_inside_root(root, path)?;

		let metadata = match std::fs::symlink_metadata(&full_path) {
			Ok(metadata) => metadata,
			Err(_) => {
				debug!(path = %full_path.display(), "nothing to clean");
				continue;
			}
		};

		let result = if metadata.is_dir() {
			std::fs::remove_dir_all(&full_path)
		} else {
			std::fs::remove_file(&full_path)
		};
		result.map_err(|source| TildeError::RemoveError {
			path: full_path.clone(),
			source,
		})?;

		info!(path = %full_path.display(), "removed");
		removed.push(full_path);
	}

	Ok(removed)
}
