//! Build tasks for tilde.
//!
//! This module handles:
//! - Applying rule tables to globbed files (preprocess/postprocess)
//! - Sequencing preprocess, compile, and postprocess for a target
//! - Removing cache directories

pub mod clean;
pub mod pipeline;
pub mod replace;

pub use clean::{clean, clean_paths};
pub use pipeline::{BuildReport, run_build, run_compile, run_postprocess, run_preprocess};
pub use replace::{Mirror, ReplaceReport, expand_globs, replace_file, replace_files};
