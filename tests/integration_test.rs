#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn tilde_cmd() -> assert_cmd::Command {
	let mut cmd = assert_cmd::Command::cargo_bin("tilde").unwrap();
	cmd.env("TILDE_NO_USER_CONFIG", "1");
	cmd
}

/// Write a compiler stand-in that copies the input to the output.
#[cfg(unix)]
fn write_fake_compiler(dir: &Path) -> std::path::PathBuf {
	use std::os::unix::fs::PermissionsExt;

	let path = dir.join("fake-sass.sh");
	fs::write(
		&path,
		"#!/bin/sh\necho \"$TILDE_TARGET $TILDE_STYLE $*\" >> compiler.log\ncat \"$TILDE_INPUT\" > \"$TILDE_OUTPUT\"\n",
	)
	.unwrap();
	fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
	path
}

#[cfg(unix)]
fn write_project(dir: &Path) {
	let compiler = write_fake_compiler(dir);
	fs::create_dir_all(dir.join("scss")).unwrap();
	fs::write(
		dir.join("scss/theme.scss"),
		"~mixinA(1px, red);\n.box { ~mixinB(2px) }\n",
	)
	.unwrap();
	fs::write(
		dir.join("Tildefile.toml"),
		format!(
			r#"
[compiler]
binary = "{}"

[targets.theme]
input = "build/scss/theme.scss"
output = "css/theme.css"
style = "compact"
preprocess = ["scss/*.scss"]
preprocess-dest = "build"
postprocess = ["css/*.css"]
"#,
			compiler.to_string_lossy()
		),
	)
	.unwrap();
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	tilde_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("SASS build runner"));
}

#[test]
fn test_version_flag() {
	tilde_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("tilde"));
}

#[test]
fn test_no_args_shows_help() {
	tilde_cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// rewrite tests
// ============================================================================

#[test]
fn test_rewrite_stdin_preprocess() {
	tilde_cmd()
		.arg("rewrite")
		.write_stdin("~mixinA(1px, red);\n.box { ~mixinB(2px) }\n")
		.assert()
		.success()
		.stdout("@include mixinA(1px, red);\n.box { @include mixinB(2px); }\n");
}

#[test]
fn test_rewrite_stdin_postprocess() {
	tilde_cmd()
		.args(["rewrite", "--table", "post"])
		.write_stdin("@include Foo(a);\n")
		.assert()
		.success()
		.stdout("~Foo(a);\n");
}

#[test]
fn test_rewrite_file_without_shorthand_is_unchanged() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = temp_dir.path().join("plain.scss");
	fs::write(&path, "a { color: red; }\n").unwrap();

	tilde_cmd()
		.arg("rewrite")
		.arg(&path)
		.assert()
		.success()
		.stdout("a { color: red; }\n");
}

#[test]
fn test_rewrite_missing_file() {
	tilde_cmd()
		.args(["rewrite", "/nonexistent/file.scss"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_rewrite_with_custom_table() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("Tildefile.toml");
	fs::write(
		&config_path,
		r#"
[[preprocess]]
pattern = '%([a-z-]+)\(([^;]*)\);'
replacement = '@include ${1}(${2});'
"#,
	)
	.unwrap();

	tilde_cmd()
		.arg("--config")
		.arg(&config_path)
		.arg("rewrite")
		.write_stdin("%pad(4px);")
		.assert()
		.success()
		.stdout("@include pad(4px);");
}

// ============================================================================
// init tests
// ============================================================================

#[test]
fn test_init_creates_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("Tildefile.toml");

	tilde_cmd()
		.arg("init")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Created Tildefile.toml"));

	let content = fs::read_to_string(&config_path).unwrap();
	assert!(content.contains("[targets.theme]"));
	assert!(content.contains("[compiler]"));
}

#[test]
fn test_init_fails_if_exists() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("Tildefile.toml"), "# existing").unwrap();

	tilde_cmd()
		.arg("init")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_overwrites() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("Tildefile.toml");
	fs::write(&config_path, "# existing").unwrap();

	tilde_cmd()
		.args(["init", "--force"])
		.current_dir(temp_dir.path())
		.assert()
		.success();

	let content = fs::read_to_string(&config_path).unwrap();
	assert!(content.contains("[targets.theme]"));
}

// ============================================================================
// config subcommand tests
// ============================================================================

#[test]
fn test_config_validate_no_config() {
	let temp_dir = tempfile::tempdir().unwrap();

	tilde_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("No configuration file found"));
}

#[test]
fn test_config_validate_valid_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		"[targets.theme]\ninput = \"a.scss\"\noutput = \"a.css\"\n",
	)
	.unwrap();

	tilde_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("valid"))
		.stdout(predicate::str::contains("1 targets"));
}

#[test]
fn test_config_validate_found_from_subdirectory() {
	let temp_dir = tempfile::tempdir().unwrap();
	let nested = temp_dir.path().join("scss").join("partials");
	fs::create_dir_all(&nested).unwrap();
	fs::write(temp_dir.path().join("Tildefile.toml"), "").unwrap();

	tilde_cmd()
		.args(["config", "validate"])
		.current_dir(&nested)
		.assert()
		.success()
		.stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_invalid_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("Tildefile.toml"), "invalid toml [[[").unwrap();

	tilde_cmd()
		.args(["config", "validate"])
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_show_displays_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		r#"
[targets.theme]
input = "scss/theme.scss"
output = "css/theme.css"
style = "compressed"
cache-location = ".sass-cache/theme"
"#,
	)
	.unwrap();

	tilde_cmd()
		.args(["config", "show"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Target theme"))
		.stdout(predicate::str::contains("style: compressed"))
		.stdout(predicate::str::contains("preprocess rules: built-in (3 rules)"))
		.stdout(predicate::str::contains(".sass-cache/theme"));
}

// ============================================================================
// Task tests
// ============================================================================

#[test]
fn test_build_without_config_fails() {
	let temp_dir = tempfile::tempdir().unwrap();

	tilde_cmd()
		.arg("build")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Tildefile.toml"));
}

#[test]
fn test_unknown_target_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		"[targets.theme]\ninput = \"a.scss\"\noutput = \"a.css\"\n",
	)
	.unwrap();

	tilde_cmd()
		.args(["preprocess", "admin"])
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Unknown target: admin"));
}

#[cfg(unix)]
#[test]
fn test_preprocess_writes_expanded_files() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_project(temp_dir.path());

	tilde_cmd()
		.args(["preprocess", "theme"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("theme: preprocessed 1 file(s), 1 changed"));

	assert_eq!(
		fs::read_to_string(temp_dir.path().join("build/scss/theme.scss")).unwrap(),
		"@include mixinA(1px, red);\n.box { @include mixinB(2px); }\n"
	);
}

#[cfg(unix)]
#[test]
fn test_build_runs_full_pipeline() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_project(temp_dir.path());

	tilde_cmd()
		.arg("build")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("theme: built css/theme.css"));

	// The fake compiler copied the preprocessed file; postprocess restored the
	// semicolon-terminated shorthand in the output.
	assert_eq!(
		fs::read_to_string(temp_dir.path().join("css/theme.css")).unwrap(),
		"~mixinA(1px, red);\n.box { ~mixinB(2px); }\n"
	);

	let log = fs::read_to_string(temp_dir.path().join("compiler.log")).unwrap();
	assert!(log.contains("theme compact --style=compact build/scss/theme.scss css/theme.css"));
}

#[cfg(unix)]
#[test]
fn test_compile_failure_propagates() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		r#"
[compiler]
binary = "false"

[targets.theme]
input = "a.scss"
output = "a.css"
"#,
	)
	.unwrap();

	tilde_cmd()
		.arg("compile")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Compile failed for target theme"));
}

#[test]
fn test_compile_missing_compiler() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		r#"
[compiler]
binary = "no-such-sass-binary-12345"

[targets.theme]
input = "a.scss"
output = "a.css"
"#,
	)
	.unwrap();

	tilde_cmd()
		.arg("compile")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Compiler not found"));
}

#[test]
fn test_clean_removes_caches() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(temp_dir.path().join(".sass-cache/x")).unwrap();
	fs::create_dir_all(temp_dir.path().join("cache/theme")).unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		r#"
[targets.theme]
input = "a.scss"
output = "a.css"
cache-location = "cache/theme"
"#,
	)
	.unwrap();

	tilde_cmd()
		.arg("clean")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Removed"));

	assert!(!temp_dir.path().join(".sass-cache").exists());
	assert!(!temp_dir.path().join("cache/theme").exists());
	assert!(temp_dir.path().join("cache").exists());

	tilde_cmd()
		.arg("clean")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn test_clean_refuses_paths_outside_project() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("Tildefile.toml"),
		"[clean]\npaths = [\"../outside\"]\n",
	)
	.unwrap();

	tilde_cmd()
		.arg("clean")
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("escapes the project root"));
}
