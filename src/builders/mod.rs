// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules turn user input into the values the walker consumes.

// The `pub mod importer;` declaration exposes the `importer` module.
//
// `importer` module:
// This module reads ignore patterns from external files, either a plain
// one-regex-per-line list or another walk config, and hands back pattern
// strings ready to be merged into a `WalkConfig`.
pub mod importer;

// The `pub mod patterns;` declaration exposes the `patterns` module.
//
// `patterns` module:
// This is the fundamental module of the crate. It compiles pattern strings
// into a `PatternSet`, reports malformed patterns as `PatternCompileError`,
// and provides the `PatternMatcher` trait with the prefix-anchored matching
// predicate the walker runs for every entry.
pub mod patterns;

// The `pub mod validator;` declaration exposes the `validator` module.
//
// `validator` module:
// This module checks a walk configuration for problems without failing:
// invalid patterns, duplicates, and patterns that would exclude everything.
pub mod validator;
