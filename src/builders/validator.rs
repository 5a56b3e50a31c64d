use anyhow::Result;
use std::collections::HashSet;

use crate::builders::patterns::{CompiledPattern, PatternMatcher};
use crate::core::config::{self, WalkConfig};

/// Paths that any pattern matching "everything" will also match. A pattern
/// that accepts all of them would empty the walk.
const PROBE_PATHS: &[&str] = &["a", "Z.txt", "0/1", ".hidden", "_", "-"];

/// The `ConfigValidator` trait defines the public interface for validating a
/// walk configuration.
///
/// Validation never fails on a bad pattern; it reports what it found so a user
/// can fix everything in one go. The `Err` case is reserved for validators
/// that need I/O.
pub trait ConfigValidator {
    /// Performs a full validation of the `WalkConfig` and returns a list of
    /// issues found.
    fn validate_config(&self, config: &WalkConfig) -> Result<Vec<String>>;

    /// Validates a single pattern string and returns a list of issues.
    fn validate_pattern(&self, pattern: &str) -> Result<Vec<String>>;
}

/// The `StandardValidator` is a concrete implementation of `ConfigValidator`.
///
/// It checks the config version, pattern syntax, duplicates, and patterns
/// that are valid but would exclude every entry.
pub struct StandardValidator;

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self
    }

    /// Reports every pattern string that appears more than once.
    fn check_duplicates(&self, patterns: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut warnings = Vec::new();

        for pattern in patterns {
            if !seen.insert(pattern.as_str()) && reported.insert(pattern.as_str()) {
                warnings.push(format!("Duplicate pattern {pattern:?}"));
            }
        }
        warnings
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &WalkConfig) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if config.version != config::CONFIG_VERSION {
            issues.push(format!("Unsupported config version: {}", config.version));
        }

        issues.extend(self.check_duplicates(&config.ignore_patterns));

        let mut checked = HashSet::new();
        for pattern in &config.ignore_patterns {
            if checked.insert(pattern.as_str()) {
                issues.extend(self.validate_pattern(pattern)?);
            }
        }

        Ok(issues)
    }

    fn validate_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if pattern.is_empty() {
            issues.push("Empty pattern matches every path".to_string());
            return Ok(issues);
        }

        match CompiledPattern::new(pattern) {
            Err(err) => issues.push(format!(
                "Invalid pattern {:?}: {} (at character {})",
                err.pattern, err.message, err.offset
            )),
            Ok(compiled) => {
                if PROBE_PATHS.iter().all(|probe| compiled.matches(probe)) {
                    issues.push(format!("Pattern {pattern:?} matches every path"));
                }
            }
        }

        Ok(issues)
    }
}
