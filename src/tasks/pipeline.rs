use crate::config::{Project, Target};
use crate::error::Result;
use crate::exec::compile_target;
use crate::rules::{TableKind, table_or_builtin};
use crate::tasks::replace::{Mirror, ReplaceReport, expand_globs, replace_files};
use tracing::info;

/// Outcome of a full build for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
	pub preprocess: ReplaceReport,
	pub postprocess: ReplaceReport,
}

fn run_table(
	project: &Project,
	name: &str,
	kind: TableKind,
	patterns: &[String],
	dest: Option<&std::path::Path>,
) -> Result<ReplaceReport> {
	let table = table_or_builtin(kind, project.config().rule_specs(kind))?;
	let files = expand_globs(&project.root, patterns)?;
	let dest = dest.map(|d| project.root.join(d));
	let mirror = dest.as_deref().map(|dir| Mirror {
		base: &project.root,
		dir,
	});

	let report = replace_files(&files, &table, mirror)?;

	info!(
		target_name = name,
		step = kind.as_str(),
		scanned = report.scanned,
		changed = report.changed,
		"{} done",
		kind.as_str()
	);

	Ok(report)
}

/// Expand shorthand in the target's preprocess files.
pub fn run_preprocess(project: &Project, name: &str, target: &Target) -> Result<ReplaceReport> {
	run_table(
		project,
		name,
		TableKind::Preprocess,
		&target.preprocess,
		target.preprocess_dest.as_deref(),
	)
}

/// Run the external compiler for the target.
pub fn run_compile(project: &Project, name: &str, target: &Target) -> Result<()> {
	compile_target(&project.compiler, name, target, &project.root)
}

/// Restore shorthand in the target's postprocess files.
pub fn run_postprocess(project: &Project, name: &str, target: &Target) -> Result<ReplaceReport> {
	run_table(
		project,
		name,
		TableKind::Postprocess,
		&target.postprocess,
		None,
	)
}

/// Preprocess, compile, then postprocess. Stops at the first failing step.
pub fn run_build(project: &Project, name: &str, target: &Target) -> Result<BuildReport> {
	let preprocess = run_preprocess(project, name, target)?;
	run_compile(project, name, target)?;
	let postprocess = run_postprocess(project, name, target)?;

	Ok(BuildReport {
		preprocess,
		postprocess,
	})
}
