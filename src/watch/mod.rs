//! File watching for tilde.
//!
//! Filesystem events come from `notify`; the paths are matched against each
//! target's watch globs and matching targets are rebuilt after a debounce
//! window.

pub mod patterns;
pub mod watcher;

pub use patterns::{TargetWatchProfile, build_watch_profiles, relative_str};
pub use watcher::{OwnWrites, matching_targets, next_batch, run_watch, settle, watch_loop};
