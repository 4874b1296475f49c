//! Shorthand rewriting for tilde.
//!
//! This module handles:
//! - The built-in preprocess/postprocess rule tables
//! - Compiling custom rule tables from configuration
//! - Applying a table to stylesheet text

pub mod rewriter;
pub mod table;

pub use rewriter::{postprocess, preprocess};
pub use table::{
	POSTPROCESS_RULES, PREPROCESS_RULES, RewriteRule, RuleSpec, RuleTable, TableKind,
	table_or_builtin,
};
