use regex::Regex;
use regex_syntax::ast::parse::Parser;
use regex_syntax::hir::translate::Translator;
use regex_syntax::hir::{Hir, Look};
use std::collections::HashSet;
use std::fmt;

use crate::core::error::PatternCompileError;

/// The `PatternMatcher` trait defines the core behavior for testing a candidate
/// path string against one or more ignore patterns.
///
/// Both a single compiled pattern and a whole set implement it, so the walker
/// and the validator can treat them uniformly.
pub trait PatternMatcher {
    /// Returns `true` if the pattern matches a leading substring of `candidate`.
    ///
    /// The match is anchored at the start of the candidate only: `"abc"` matches
    /// `"abcdef"`, `"bcd"` does not, and `"ab"` matches `"abc"` even though the
    /// whole string is not consumed.
    fn matches(&self, candidate: &str) -> bool;
}

/// A single ignore pattern after a successful compilation.
///
/// This keeps the pattern text next to the compiled `Regex` so the
/// pattern can be reported back to the user (in validation issues and
/// `Debug` output) exactly as it was written.
#[derive(Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles one pattern string.
    ///
    /// # Arguments
    /// * `pattern`: The regular expression as written by the user.
    ///
    /// # Returns
    /// `Result<Self, PatternCompileError>`. The error carries the pattern, the
    /// parser's message and the character offset of the failure.
    pub fn new(pattern: &str) -> Result<Self, PatternCompileError> {
        let ast = Parser::new().parse(pattern).map_err(|err| {
            compile_error(pattern, err.kind().to_string(), err.span().start.offset)
        })?;
        let hir = Translator::new().translate(pattern, &ast).map_err(|err| {
            compile_error(pattern, err.kind().to_string(), err.span().start.offset)
        })?;

        // Pin the expression to the start of the candidate. Working on the HIR
        // keeps inline flags such as `(?x)` comments from swallowing the anchor.
        let anchored = Hir::concat(vec![Hir::look(Look::Start), hir]);
        let regex = Regex::new(&anchored.to_string())
            .map_err(|err| compile_error(pattern, err.to_string(), 0))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PatternMatcher for CompiledPattern {
    fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledPattern").field(&self.source).finish()
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// An immutable, unordered collection of compiled ignore patterns.
///
/// Built once per traversal and never mutated afterwards, so it can be shared
/// freely between walkers, including walkers running on other threads.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// An empty set. Walking with it is the same as walking without one.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles every pattern, stopping at the first malformed one.
    ///
    /// Either all patterns compile and a set is returned, or the first failure
    /// is returned and nothing else is kept. Patterns with identical source
    /// text are stored once.
    pub fn compile<I, S>(patterns: I) -> Result<Self, PatternCompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if !seen.insert(pattern.to_string()) {
                continue;
            }
            compiled.push(CompiledPattern::new(pattern)?);
        }

        Ok(Self {
            patterns: compiled,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter()
    }
}

impl PatternMatcher for PatternSet {
    /// Returns `true` if at least one pattern in the set matches.
    ///
    /// An empty set or an empty candidate never matches and never runs a regex.
    fn matches(&self, candidate: &str) -> bool {
        if self.patterns.is_empty() || candidate.is_empty() {
            return false;
        }
        self.patterns.iter().any(|pattern| pattern.matches(candidate))
    }
}

/// Compiles a collection of pattern strings into a `PatternSet`.
pub fn compile_patterns<I, S>(patterns: I) -> Result<PatternSet, PatternCompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PatternSet::compile(patterns)
}

/// Checks `candidate` against an optional pattern set.
///
/// A missing set behaves exactly like an empty one.
pub fn match_any(candidate: &str, patterns: Option<&PatternSet>) -> bool {
    patterns.is_some_and(|set| set.matches(candidate))
}

/// Builds a `PatternCompileError`, converting the parser's byte offset into
/// a character offset.
fn compile_error(pattern: &str, message: String, byte_offset: usize) -> PatternCompileError {
    PatternCompileError {
        pattern: pattern.to_string(),
        message,
        offset: char_offset(pattern, byte_offset),
    }
}

fn char_offset(pattern: &str, byte_offset: usize) -> usize {
    pattern
        .char_indices()
        .take_while(|(index, _)| *index < byte_offset)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_anchored_matching() {
        let set = PatternSet::compile(["abc"]).unwrap();
        assert!(set.matches("abcdef"));
        assert!(!set.matches("xabc"));

        let set = PatternSet::compile(["bcd"]).unwrap();
        assert!(!set.matches("abcdef"));
    }

    #[test]
    fn test_match_does_not_need_full_string() {
        let pattern = CompiledPattern::new(r"src/\w+").unwrap();
        assert!(pattern.matches("src/main.rs"));
        assert!(!pattern.matches("lib/src/main.rs"));
    }

    #[test]
    fn test_empty_candidate_or_set_never_matches() {
        let set = PatternSet::compile([".*"]).unwrap();
        assert!(!set.matches(""));

        let empty = PatternSet::empty();
        assert!(!empty.matches("anything"));
        assert!(!match_any("anything", None));
        assert!(!match_any("", Some(&set)));
        assert!(match_any("anything", Some(&set)));
    }

    #[test]
    fn test_any_pattern_in_set_matches() {
        let set = compile_patterns(["target", r"\.git", "node_modules"]).unwrap();
        assert!(set.matches("target/debug"));
        assert!(set.matches(".gitignore"));
        assert!(!set.matches("src/target"));
    }

    #[test]
    fn test_anchor_survives_inline_flags() {
        let multi_line = CompiledPattern::new("(?m)^logs").unwrap();
        assert!(multi_line.matches("logs/a.txt"));
        assert!(!multi_line.matches("x\nlogs"));

        let verbose = CompiledPattern::new("(?x) logs  # build output").unwrap();
        assert!(verbose.matches("logs/a.txt"));
        assert!(!verbose.matches("app/logs"));

        assert!(CompiledPattern::new("x*").unwrap().matches("abc"));
        assert!(CompiledPattern::new("a|ab").unwrap().matches("abc"));
        assert!(!CompiledPattern::new("b|c").unwrap().matches("abc"));
    }

    #[test]
    fn test_duplicates_are_stored_once() {
        let set = PatternSet::compile(["logs", "logs", "tmp"]).unwrap();
        assert_eq!(set.len(), 2);
        let mut sources: Vec<&str> = set.iter().map(CompiledPattern::as_str).collect();
        sources.sort();
        assert_eq!(sources, vec!["logs", "tmp"]);
    }

    #[test]
    fn test_invalid_pattern_fails_whole_set() {
        let err = PatternSet::compile(["logs", "a(b", "tmp"]).unwrap_err();
        assert_eq!(err.pattern, "a(b");
        assert_eq!(err.offset, 1);
        assert!(err.message.contains("unclosed group"), "{}", err.message);
    }

    #[test]
    fn test_first_invalid_pattern_is_reported() {
        let err = PatternSet::compile(["ok", "[z-a]", "(unclosed"]).unwrap_err();
        assert_eq!(err.pattern, "[z-a]");
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_offset_counts_characters_not_bytes() {
        // 'é' is two bytes wide; the unclosed group opens at character 2.
        let err = CompiledPattern::new("éé(x").unwrap_err();
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_compiling_twice_matches_identically() {
        let patterns = ["build", r"\.cache", "tmp[0-9]+"];
        let first = PatternSet::compile(patterns).unwrap();
        let second = PatternSet::compile(patterns).unwrap();
        for candidate in ["build/out", ".cache", "tmp12/x", "src", "", "tmpx"] {
            assert_eq!(first.matches(candidate), second.matches(candidate));
        }
    }

    #[test]
    fn test_display_shows_source() {
        let pattern = CompiledPattern::new("logs/.*").unwrap();
        assert_eq!(pattern.to_string(), "logs/.*");
        assert_eq!(format!("{pattern:?}"), "CompiledPattern(\"logs/.*\")");
    }
}
