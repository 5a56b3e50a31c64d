use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::builders::patterns::PatternSet;
use crate::core::config::ConfigFormat;

/// The formats patterns can be imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// One regular expression per line. Blank lines and lines starting with
    /// `#` are skipped.
    PatternList,
    /// Another walk config (TOML, JSON or YAML, picked by extension); only its
    /// `ignore_patterns` are taken.
    Config,
}

/// A trait that defines the behavior for importing ignore patterns from a source.
///
/// This trait allows for different implementations of pattern importers (e.g., from
/// files, from a network source) to be used interchangeably.
pub trait PatternImporter {
    /// Imports patterns from a file.
    ///
    /// # Arguments
    /// * `file_path`: The path to the file to be imported.
    /// * `kind`: The format to parse the file as.
    ///
    /// # Returns
    /// A `Result<Vec<String>>` with the pattern strings in file order, ready to be
    /// merged into a `WalkConfig`. Every returned pattern is known to compile.
    fn import_from_file(&mut self, file_path: &Path, kind: ImportKind) -> Result<Vec<String>>;
}

/// A concrete implementation of `PatternImporter` for handling file-based imports.
pub struct FileImporter;

impl PatternImporter for FileImporter {
    fn import_from_file(&mut self, file_path: &Path, kind: ImportKind) -> Result<Vec<String>> {
        // Read the entire file content into a string.
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read import file {}", file_path.display()))?;

        let patterns = match kind {
            ImportKind::PatternList => self.parse_pattern_list(&content),
            ImportKind::Config => {
                ConfigFormat::from_path(file_path)
                    .parse(&content)?
                    .ignore_patterns
            }
        };

        // Reject the whole import if any pattern is malformed.
        PatternSet::compile(&patterns)
            .with_context(|| format!("Invalid pattern in {}", file_path.display()))?;

        Ok(patterns)
    }
}

impl FileImporter {
    /// Constructs a new `FileImporter` instance.
    pub fn new() -> Self {
        Self
    }

    /// Parses a plain pattern list.
    ///
    /// Each non-empty line that does not start with `#` is taken as a regular
    /// expression with surrounding whitespace removed. No glob translation is
    /// done: `*.log` stays `*.log` and fails to compile.
    fn parse_pattern_list(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }
}

impl Default for FileImporter {
    fn default() -> Self {
        Self::new()
    }
}
