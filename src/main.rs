use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tilde_sass::TildeError;
use tilde_sass::config::{
	CONFIG_FILE_NAME, Project, generate_init_template, load_project, user_config_path,
};
use tilde_sass::logging::init_logging;
use tilde_sass::rules::{RuleTable, TableKind, table_or_builtin};
use tilde_sass::tasks::{
	clean, clean_paths, run_build, run_compile, run_postprocess, run_preprocess,
};
use tilde_sass::watch::run_watch;

#[derive(Parser)]
#[command(name = "tilde")]
#[command(
	author,
	version,
	about = "SASS build runner that expands ~mixin() shorthand before compiling"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Use this config file instead of searching for Tildefile.toml
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Logging level; falls back to TILDE_LOG, then info
	#[arg(long, global = true, value_enum, value_name = "LEVEL")]
	log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
enum Commands {
	/// Apply a rule table to a file (or stdin) and print the result
	Rewrite {
		/// Which table to apply
		#[arg(long, value_enum, default_value_t = TableArg::Pre)]
		table: TableArg,

		/// Input file; reads stdin when omitted
		file: Option<PathBuf>,
	},
	/// Expand shorthand in the target's preprocess files
	Preprocess { target: Option<String> },
	/// Run the SASS compiler for the target
	Compile { target: Option<String> },
	/// Restore shorthand in the target's postprocess files
	Postprocess { target: Option<String> },
	/// Preprocess, compile, then postprocess
	Build { target: Option<String> },
	/// Rebuild targets whenever their watched files change
	Watch { target: Option<String> },
	/// Remove SASS cache directories
	Clean,
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
	/// Create a template Tildefile.toml in the current directory
	Init {
		/// Overwrite an existing Tildefile.toml
		#[arg(long)]
		force: bool,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective configuration
	Show,
	/// Check the configuration for errors without running anything
	Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableArg {
	#[value(alias = "preprocess")]
	Pre,
	#[value(alias = "postprocess")]
	Post,
}

impl From<TableArg> for TableKind {
	fn from(arg: TableArg) -> Self {
		match arg {
			TableArg::Pre => TableKind::Preprocess,
			TableArg::Post => TableKind::Postprocess,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

impl From<LogLevel> for tracing::Level {
	fn from(lvl: LogLevel) -> Self {
		match lvl {
			LogLevel::Error => tracing::Level::ERROR,
			LogLevel::Warn => tracing::Level::WARN,
			LogLevel::Info => tracing::Level::INFO,
			LogLevel::Debug => tracing::Level::DEBUG,
			LogLevel::Trace => tracing::Level::TRACE,
		}
	}
}

/// Which pipeline step a command runs.
#[derive(Clone, Copy)]
enum Step {
	Preprocess,
	Compile,
	Postprocess,
	Build,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.log_level.map(tracing::Level::from));

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<ExitCode> {
	let config = cli.config.as_deref();

	match cli.command {
		Commands::Rewrite { table, file } => {
			handle_rewrite(config, table.into(), file.as_deref())
		}
		Commands::Preprocess { target } => {
			handle_step(config, target.as_deref(), Step::Preprocess)
		}
		Commands::Compile { target } => handle_step(config, target.as_deref(), Step::Compile),
		Commands::Postprocess { target } => {
			handle_step(config, target.as_deref(), Step::Postprocess)
		}
		Commands::Build { target } => handle_step(config, target.as_deref(), Step::Build),
		Commands::Watch { target } => handle_watch(config, target.as_deref()),
		Commands::Clean => handle_clean(config),
		Commands::Config { action } => match action {
			ConfigAction::Show => handle_config_show(config),
			ConfigAction::Validate => handle_config_validate(config),
		},
		Commands::Init { force } => handle_init(force),
	}
}

fn open_project(config: Option<&Path>) -> Result<Project> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	load_project(&cwd, config).context("Failed to load configuration")
}

fn handle_rewrite(
	config: Option<&Path>,
	kind: TableKind,
	file: Option<&Path>,
) -> Result<ExitCode> {
	let input = match file {
		Some(path) => std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read {}", path.display()))?,
		None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
	};

	// Custom tables only apply when a config file is named explicitly.
	let project = config.map(|_| open_project(config)).transpose()?;
	let specs = project.as_ref().and_then(|p| p.config().rule_specs(kind));
	let table = table_or_builtin(kind, specs).context("Failed to compile rules")?;

	print!("{}", table.apply(&input));
	Ok(ExitCode::SUCCESS)
}

fn handle_step(config: Option<&Path>, target: Option<&str>, step: Step) -> Result<ExitCode> {
	let project = open_project(config)?;
	let targets = project.select_targets(target)?;

	if targets.is_empty() {
		println!("No targets configured.");
		return Ok(ExitCode::SUCCESS);
	}

	for (name, target) in targets {
		match step {
			Step::Preprocess => {
				let report = run_preprocess(&project, name, target)
					.with_context(|| format!("Preprocess failed for target {}", name))?;
				println!(
					"{}: preprocessed {} file(s), {} changed",
					name, report.scanned, report.changed
				);
			}
			Step::Compile => {
				run_compile(&project, name, target)
					.with_context(|| format!("Compile failed for target {}", name))?;
				println!("{}: compiled {}", name, target.output.display());
			}
			Step::Postprocess => {
				let report = run_postprocess(&project, name, target)
					.with_context(|| format!("Postprocess failed for target {}", name))?;
				println!(
					"{}: postprocessed {} file(s), {} changed",
					name, report.scanned, report.changed
				);
			}
			Step::Build => {
				let report = run_build(&project, name, target)
					.with_context(|| format!("Build failed for target {}", name))?;
				println!(
					"{}: built {} ({} preprocessed, {} postprocessed)",
					name,
					target.output.display(),
					report.preprocess.changed,
					report.postprocess.changed
				);
			}
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_watch(config: Option<&Path>, target: Option<&str>) -> Result<ExitCode> {
	let project = open_project(config)?;
	run_watch(&project, target).context("File watcher failed")?;
	Ok(ExitCode::SUCCESS)
}

fn handle_clean(config: Option<&Path>) -> Result<ExitCode> {
	let project = open_project(config)?;
	let removed = clean(&project.root, &clean_paths(&project)).context("Clean failed")?;

	if removed.is_empty() {
		println!("Nothing to clean.");
	}
	for path in &removed {
		println!("Removed {}", path.display());
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
	}

	let template = generate_init_template();
	std::fs::write(&config_path, template)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {}", CONFIG_FILE_NAME);
	Ok(ExitCode::SUCCESS)
}

fn describe_table(project: &Project, kind: TableKind) -> String {
	match project.config().rule_specs(kind) {
		Some(specs) => format!("custom ({} rules)", specs.len()),
		None => format!("built-in ({} rules)", RuleTable::builtin(kind).len()),
	}
}

fn handle_config_show(config: Option<&Path>) -> Result<ExitCode> {
	let project = open_project(config)?;
	let cfg = project.config();

	println!("# Source: {}", project.project.path.display());
	println!("# root: {}", project.root.display());
	match project.user {
		Some(ref user) => println!("# user config: {}", user.path.display()),
		None => println!("# user config: (none)"),
	}
	println!();

	println!("compiler: {}", project.compiler.binary);
	if !project.compiler.args.is_empty() {
		println!("compiler args: {}", project.compiler.args.join(" "));
	}
	println!("preprocess rules: {}", describe_table(&project, TableKind::Preprocess));
	println!("postprocess rules: {}", describe_table(&project, TableKind::Postprocess));
	let clean: Vec<String> = clean_paths(&project)
		.iter()
		.map(|p| p.display().to_string())
		.collect();
	println!("clean: {}", clean.join(", "));
	println!("watch debounce: {}ms", cfg.watch.debounce_ms);
	println!();

	for (name, target) in &cfg.targets {
		println!("  Target {}:", name);
		println!("    input: {}", target.input.display());
		println!("    output: {}", target.output.display());
		println!("    style: {}", target.style.as_str());
		if let Some(ref cache) = target.cache_location {
			println!("    cache-location: {}", cache.display());
		}
		if !target.preprocess.is_empty() {
			println!("    preprocess: {}", target.preprocess.join(", "));
		}
		if let Some(ref dest) = target.preprocess_dest {
			println!("    preprocess-dest: {}", dest.display());
		}
		if !target.postprocess.is_empty() {
			println!("    postprocess: {}", target.postprocess.join(", "));
		}
		println!("    watch: {}", target.watch_patterns().join(", "));
		println!();
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(config: Option<&Path>) -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	match load_project(&cwd, config) {
		Ok(project) => {
			println!(
				"Configuration is valid: {} ({} targets)",
				project.project.path.display(),
				project.config().targets.len()
			);
			Ok(ExitCode::SUCCESS)
		}
		Err(TildeError::ConfigNotFound { .. }) => {
			println!("No configuration file found.");
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
