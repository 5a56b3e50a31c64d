// This file is the module declaration file for the `core` module.
// In Rust, a `mod.rs` file within a directory (e.g., `src/core/`)
// serves two main purposes:
//
// 1. It declares the submodules contained within that directory.
// 2. It exposes these submodules to the parent module (`src/` in this case),
//    making them accessible to the entire crate.

// `config` module:
// This module is responsible for managing the walk configuration. It defines
// `WalkConfig`, the `ConfigProvider` trait, and the `ConfigManager` that loads,
// saves, exports and validates config files in TOML, JSON or YAML.
pub mod config;
pub mod error;
pub mod walker;
