//! Tilde - SASS build runner with `~mixin()` shorthand support.
//!
//! This library provides the core functionality for tilde, including:
//! - Rewriting `~name(args)` shorthand to `@include name(args);` and back
//! - Project configuration discovery and parsing
//! - The preprocess → compile → postprocess pipeline and cache cleaning
//! - Rebuilding targets on file changes
//!
//! # Example
//!
//! ```
//! use tilde_sass::rules::{postprocess, preprocess};
//!
//! let expanded = preprocess(".box { ~shadow(2px) }\n");
//! assert_eq!(expanded, ".box { @include shadow(2px); }\n");
//!
//! assert_eq!(postprocess("@include shadow(2px);"), "~shadow(2px);");
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod rules;
pub mod tasks;
pub mod watch;

pub use error::{Result, TildeError};
