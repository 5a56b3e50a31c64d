//! Recursive directory listing that prunes entries matching regex patterns.
//!
//! Patterns are regular expressions matched against the start of each
//! entry's path relative to the walk root: `logs` excludes `logs`,
//! `logs/a.txt` and `logs2`, but not `app/logs`. A matching directory is
//! skipped together with everything below it.
//!
//! ```no_run
//! use prune_walk::{PatternSet, Walker};
//!
//! let patterns = PatternSet::compile(["target", r"\.git"])?;
//! for entry in Walker::new("my-project").with_patterns(&patterns) {
//!     let entry = entry?;
//!     println!("{} {}", if entry.is_dir() { "d" } else { "f" }, entry);
//! }
//! # Ok::<(), prune_walk::Error>(())
//! ```
pub mod builders;
pub mod core;
pub mod utils;


pub use crate::builders::patterns::{
    CompiledPattern, PatternMatcher, PatternSet, compile_patterns, match_any,
};
pub use crate::core::config::{ConfigManager, ConfigProvider, WalkConfig};
pub use crate::core::error::{Error, PatternCompileError, Result, TraversalError};
pub use crate::core::walker::{EntryKind, MatchTarget, PathEntry, WalkOptions, Walker};
pub use crate::utils::walk_with_patterns;
