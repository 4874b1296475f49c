//! Configuration loading and parsing for tilde.
//!
//! This module handles:
//! - TOML config file parsing and validation
//! - Project config discovery and the per-user config
//! - Compiler settings merging
//! - The `tilde init` template

pub mod cascade;
pub mod parser;
pub mod template;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, find_project_config, load_project, load_user_config, merge_compiler,
	user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use template::generate_init_template;
pub use types::{
	CompilerSettings, Config, LoadedConfig, OutputStyle, Project, Target,
};
