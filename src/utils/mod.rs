use std::path::{Path, PathBuf};

use crate::builders::patterns::PatternSet;
use crate::core::error::Result;
use crate::core::walker::{PathEntry, WalkOptions, Walker};

/// Compile `patterns` and collect every entry below `root` that survives them.
///
/// Fails with `Error::Pattern` before touching the filesystem if a pattern is
/// malformed, or with `Error::Traversal` if the walk hits an I/O failure.
pub fn walk_with_patterns<I, S>(root: impl AsRef<Path>, patterns: I) -> Result<Vec<PathEntry>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    walk_with_options(root, patterns, WalkOptions::default())
}

pub fn walk_with_options<I, S>(
    root: impl AsRef<Path>,
    patterns: I,
    options: WalkOptions,
) -> Result<Vec<PathEntry>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let patterns = PatternSet::compile(patterns)?;
    let entries = Walker::new(root)
        .with_patterns(&patterns)
        .with_options(options)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Same as `walk_with_patterns`, returning bare relative paths.
pub fn relative_paths<I, S>(root: impl AsRef<Path>, patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(walk_with_patterns(root, patterns)?
        .into_iter()
        .map(PathEntry::into_path)
        .collect())
}
