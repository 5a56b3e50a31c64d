//! Lazy, depth-first directory walker with regex-based pruning.
//!
//! The walker yields every directory and file below a root, each relative to
//! that root. A directory appears before the files it directly contains, and
//! its subdirectories follow those files. Directories whose relative path
//! matches an ignore pattern are skipped together with their whole subtree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, trace, warn};

use crate::builders::patterns::{PatternSet, match_any};
use crate::core::error::TraversalError;

/// Which string a file entry is tested against.
///
/// Directories are always tested by their relative path; pruning a subtree by
/// a bare directory name is done with a pattern such as `(.*/)?target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTarget {
    /// Test `src/test_main.py`.
    #[default]
    RelativePath,
    /// Test only `test_main.py`.
    FileName,
}

/// Options for a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// What file entries are matched against.
    pub match_target: MatchTarget,
    /// Sort the children of every directory by name. When false, entries come
    /// out in whatever order the operating system lists them.
    pub sort: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One path produced by the walker, relative to the walk root.
///
/// Anything that is not a directory (regular files, symlinks, sockets) is
/// reported as `EntryKind::File`. Symlinks are never followed, and a symlink
/// pointing at a directory is still listed as a `File` leaf. Walkers that
/// classify the link by its target and then refuse to descend (as `os.walk`
/// does) drop such links from the output entirely; this one keeps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    path: PathBuf,
    kind: EntryKind,
}

impl PathEntry {
    fn directory(path: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
        }
    }

    fn file(path: PathBuf) -> Self {
        Self {
            path,
            kind: EntryKind::File,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// The relative path with `/` separators, as it is shown to patterns.
    pub fn to_slash_string(&self) -> String {
        slash_path(&self.path)
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_slash_string())
    }
}

/// Children of one directory that have not been handed out yet.
///
/// The directory handle is already closed by the time a frame exists.
struct Frame {
    files: vec::IntoIter<PathBuf>,
    subdirs: vec::IntoIter<PathBuf>,
}

/// Iterator over the entries below a root directory.
///
/// Each `Walker` performs one fresh, single-pass walk. Errors are reported once,
/// at the point the next entry would have been produced, after which the
/// iterator only returns `None`.
///
/// # Examples
/// ```no_run
/// use prune_walk::{PatternSet, Walker};
///
/// let patterns = PatternSet::compile(["target", r"\.git"])?;
/// for entry in Walker::new(".").with_patterns(&patterns) {
///     println!("{}", entry?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Walker<'a> {
    root: PathBuf,
    patterns: Option<&'a PatternSet>,
    options: WalkOptions,
    // Directory emitted last and not read yet. The root starts here as "".
    pending: Option<PathBuf>,
    stack: Vec<Frame>,
    finished: bool,
}

impl<'a> Walker<'a> {
    /// Create a walker for everything below `root`. Nothing is read until the
    /// first call to `next`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            patterns: None,
            options: WalkOptions::default(),
            pending: Some(PathBuf::new()),
            stack: Vec::new(),
            finished: false,
        }
    }

    /// Exclude entries matching any of these patterns.
    pub fn with_patterns(mut self, patterns: &'a PatternSet) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, relative: &Path) -> PathBuf {
        if relative.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Read one directory completely and close it.
    fn read_frame(&self, relative: &Path) -> Result<Frame, TraversalError> {
        let dir = self.absolute(relative);

        if relative.as_os_str().is_empty() {
            let metadata = fs::metadata(&dir).map_err(|e| TraversalError::io(&dir, e))?;
            if !metadata.is_dir() {
                return Err(TraversalError::NotADirectory { path: dir });
            }
        }

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| TraversalError::io(&dir, e))? {
            let entry = entry.map_err(|e| TraversalError::io(&dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| TraversalError::io(entry.path(), e))?;
            let child = relative.join(entry.file_name());
            if file_type.is_dir() {
                subdirs.push(child);
            } else {
                files.push(child);
            }
        }

        if self.options.sort {
            files.sort();
            subdirs.sort();
        }

        Ok(Frame {
            files: files.into_iter(),
            subdirs: subdirs.into_iter(),
        })
    }

    fn finish(&mut self) {
        self.finished = true;
        self.pending = None;
        self.stack.clear();
    }
}

impl Iterator for Walker<'_> {
    type Item = Result<PathEntry, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let patterns = self.patterns;
        let match_target = self.options.match_target;

        if let Some(dir) = self.pending.take() {
            if dir.as_os_str().is_empty() && match_any(".", patterns) {
                debug!(root = %self.root.display(), "root matches an ignore pattern, nothing to walk");
                self.finish();
                return None;
            }
            match self.read_frame(&dir) {
                Ok(frame) => self.stack.push(frame),
                Err(err) => {
                    warn!(path = %err.path().display(), error = %err, "walk aborted");
                    self.finish();
                    return Some(Err(err));
                }
            }
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.finished = true;
                return None;
            };

            if let Some(file) = frame.files.next() {
                if file_excluded(&file, patterns, match_target) {
                    trace!(path = %file.display(), "skipping ignored file");
                    continue;
                }
                trace!(path = %file.display(), "file");
                return Some(Ok(PathEntry::file(file)));
            }

            if let Some(dir) = frame.subdirs.next() {
                if match_any(&slash_path(&dir), patterns) {
                    debug!(path = %dir.display(), "pruning ignored directory");
                    continue;
                }
                trace!(path = %dir.display(), "directory");
                self.pending = Some(dir.clone());
                return Some(Ok(PathEntry::directory(dir)));
            }

            self.stack.pop();
        }
    }
}

impl FusedIterator for Walker<'_> {}

fn file_excluded(path: &Path, patterns: Option<&PatternSet>, target: MatchTarget) -> bool {
    match target {
        MatchTarget::RelativePath => match_any(&slash_path(path), patterns),
        MatchTarget::FileName => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default();
            match_any(&name, patterns)
        }
    }
}

/// Render a relative path with `/` separators on every platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_slash_path_joins_components() {
        let path = Path::new("a").join("b").join("c.txt");
        assert_eq!(slash_path(&path), "a/b/c.txt");
        assert_eq!(slash_path(Path::new("")), "");
    }

    #[test]
    fn test_directory_precedes_its_files_and_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/one.txt"), "").unwrap();
        fs::write(dir.path().join("a/b/two.txt"), "").unwrap();

        let entries: Vec<String> = Walker::new(dir.path())
            .map(|entry| entry.unwrap().to_string())
            .collect();

        assert_eq!(entries, vec!["a", "a/one.txt", "a/b", "a/b/two.txt"]);
    }

    #[test]
    fn test_sorted_walk_is_lexicographic_per_directory() {
        let dir = tempdir().unwrap();
        for name in ["c", "a", "b"] {
            fs::create_dir(dir.path().join(name)).unwrap();
            fs::write(dir.path().join(format!("{name}.txt")), "").unwrap();
        }

        let options = WalkOptions {
            sort: true,
            ..WalkOptions::default()
        };
        let entries: Vec<String> = Walker::new(dir.path())
            .with_options(options)
            .map(|entry| entry.unwrap().to_string())
            .collect();

        assert_eq!(entries, vec!["a.txt", "b.txt", "c.txt", "a", "b", "c"]);
    }

    #[test]
    fn test_entry_kinds() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("file"), "").unwrap();

        let mut entries: Vec<PathEntry> = Walker::new(dir.path()).map(Result::unwrap).collect();
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        assert_eq!(entries[0].path(), Path::new("file"));
        assert_eq!(entries[0].kind(), EntryKind::File);
        assert!(entries[1].is_dir());
        assert_eq!(entries[1].clone().into_path(), PathBuf::from("sub"));
    }

    #[test]
    fn test_root_matching_pattern_yields_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file"), "").unwrap();
        let patterns = PatternSet::compile([r"\."]).unwrap();

        let mut walker = Walker::new(dir.path()).with_patterns(&patterns);
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_iterator_is_fused_after_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        let mut walker = Walker::new(&missing);
        let err = walker.next().unwrap().unwrap_err();
        assert_eq!(err.path(), missing.as_path());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_match_target_deserializes_kebab_case() {
        let options: WalkOptions =
            serde_json::from_str(r#"{"match_target": "file-name"}"#).unwrap();
        assert_eq!(options.match_target, MatchTarget::FileName);
        assert!(!options.sort);
    }
}
