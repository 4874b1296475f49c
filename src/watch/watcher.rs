use crate::config::{Project, Target};
use crate::error::Result;
use crate::tasks::{BuildReport, run_build};
use crate::watch::patterns::{TargetWatchProfile, build_watch_profiles, relative_str};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

type EventResult = notify::Result<Event>;

/// Paths written by a build. Events on them do not queue another build.
#[derive(Debug, Default)]
pub struct OwnWrites {
	files: BTreeSet<PathBuf>,
	dirs: Vec<PathBuf>,
}

impl OwnWrites {
	/// Record what building `target` wrote. The output file and cache
	/// directory are recorded even when the build failed.
	pub fn record(&mut self, root: &Path, target: &Target, report: Option<&BuildReport>) {
		self.files.insert(root.join(&target.output));
		if let Some(ref cache) = target.cache_location {
			self.dirs.push(root.join(cache));
		}
		if let Some(report) = report {
			self.files.extend(report.preprocess.written.iter().cloned());
			self.files.extend(report.postprocess.written.iter().cloned());
		}
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.files.contains(path) || self.dirs.iter().any(|dir| path.starts_with(dir))
	}
}

/// Names of the targets whose watch globs match a path in `event`.
pub fn matching_targets(
	root: &Path,
	profiles: &[TargetWatchProfile],
	event: &Event,
) -> Vec<String> {
	if matches!(event.kind, EventKind::Access(_)) {
		return Vec::new();
	}

	let mut names = Vec::new();
	for path in &event.paths {
		let Some(rel) = relative_str(root, path) else {
			debug!("ignoring event outside project root: {}", path.display());
			continue;
		};
		for profile in profiles {
			if profile.matches(&rel) && !names.iter().any(|n| n == profile.name()) {
				debug!(target_name = profile.name(), path = %rel, "watch match");
				names.push(profile.name().to_string());
			}
		}
	}
	names
}

fn collect(
	root: &Path,
	profiles: &[TargetWatchProfile],
	res: EventResult,
	own: &OwnWrites,
	pending: &mut BTreeSet<String>,
) {
	match res {
		Ok(mut event) => {
			event.paths.retain(|path| !own.contains(path));
			pending.extend(matching_targets(root, profiles, &event));
		}
		Err(err) => warn!("file watch error: {err}"),
	}
}

/// Block until a relevant change arrives, then keep collecting for `debounce`.
///
/// `pending` holds targets already queued; when it is non-empty the call does
/// not wait for a new change. Returns the affected target names, or `None`
/// once the event source is gone and nothing is queued.
pub fn next_batch(
	rx: &Receiver<EventResult>,
	root: &Path,
	profiles: &[TargetWatchProfile],
	debounce: Duration,
	mut pending: BTreeSet<String>,
) -> Option<BTreeSet<String>> {
	let own = OwnWrites::default();

	while pending.is_empty() {
		let res = rx.recv().ok()?;
		collect(root, profiles, res, &own, &mut pending);
	}

	let deadline = Instant::now() + debounce;
	loop {
		let remaining = deadline.saturating_duration_since(Instant::now());
		if remaining.is_zero() {
			break;
		}
		match rx.recv_timeout(remaining) {
			Ok(res) => collect(root, profiles, res, &own, &mut pending),
			Err(RecvTimeoutError::Timeout) => break,
			Err(RecvTimeoutError::Disconnected) => break,
		}
	}

	Some(pending)
}

/// Read events until none arrive for `quiet`, skipping paths in `own`.
///
/// Returns the targets that changed for other reasons while the build ran.
pub fn settle(
	rx: &Receiver<EventResult>,
	root: &Path,
	profiles: &[TargetWatchProfile],
	quiet: Duration,
	own: &OwnWrites,
) -> BTreeSet<String> {
	let mut pending = BTreeSet::new();
	while let Ok(res) = rx.recv_timeout(quiet) {
		collect(root, profiles, res, own, &mut pending);
	}
	pending
}

/// Rebuild targets whenever their watched files change. Runs until the
/// watcher shuts down.
pub fn run_watch(project: &Project, target: Option<&str>) -> Result<()> {
	let profiles = build_watch_profiles(project, target)?;
	let debounce = Duration::from_millis(project.config().watch.debounce_ms);

	let (tx, rx) = std::sync::mpsc::channel::<EventResult>();
	let mut watcher = notify::recommended_watcher(move |res: EventResult| {
		// The receiver only goes away when the loop below exits.
		let _ = tx.send(res);
	})?;
	watcher.watch(&project.root, RecursiveMode::Recursive)?;

	info!(
		root = %project.root.display(),
		targets = ?profiles.iter().map(TargetWatchProfile::name).collect::<Vec<_>>(),
		"watching for changes"
	);

	watch_loop(project, &rx, &profiles, debounce);
	Ok(())
}

/// Run builds for each batch of changes from `rx`.
pub fn watch_loop(
	project: &Project,
	rx: &Receiver<EventResult>,
	profiles: &[TargetWatchProfile],
	debounce: Duration,
) {
	let mut queued = BTreeSet::new();

	while let Some(batch) = next_batch(rx, &project.root, profiles, debounce, queued) {
		let mut own = OwnWrites::default();

		for name in &batch {
			let target = match project.target(name) {
				Ok(target) => target,
				Err(err) => {
					error!("{err}");
					continue;
				}
			};

			info!(target_name = %name, "change detected, rebuilding");
			match run_build(project, name, target) {
				Ok(report) => {
					info!(
						target_name = %name,
						preprocessed = report.preprocess.changed,
						postprocessed = report.postprocess.changed,
						"build finished"
					);
					own.record(&project.root, target, Some(&report));
				}
				Err(err) => {
					error!(target_name = %name, "build failed: {err}");
					own.record(&project.root, target, None);
				}
			}
		}

		queued = settle(rx, &project.root, profiles, debounce, &own);
		if !queued.is_empty() {
			debug!(targets = ?queued, "changes arrived during build");
		}
	}

	debug!("file watcher loop ended");
}
