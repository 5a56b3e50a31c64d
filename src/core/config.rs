use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::builders::importer::{FileImporter, ImportKind, PatternImporter};
use crate::builders::patterns::{CompiledPattern, PatternSet};
use crate::builders::validator::{ConfigValidator, StandardValidator};
use crate::core::error::PatternCompileError;
use crate::core::walker::WalkOptions;

/// Config file name used by `ConfigManager::in_dir`.
pub const DEFAULT_CONFIG_FILE: &str = "prune-walk.toml";
pub const CONFIG_VERSION: &str = "1.0";

/// Persistent description of a walk: which patterns to ignore and how.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WalkConfig {
    pub version: String,
    pub ignore_patterns: Vec<String>,
    pub options: WalkOptions,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            ignore_patterns: Vec::new(),
            options: WalkOptions::default(),
        }
    }
}

impl WalkConfig {
    /// Compile the configured patterns into a set ready for walking.
    pub fn compile(&self) -> Result<PatternSet, PatternCompileError> {
        PatternSet::compile(&self.ignore_patterns)
    }

    /// Append patterns that are not configured yet, keeping the existing order.
    pub fn merge_patterns<I>(&mut self, patterns: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for pattern in patterns {
            if !self.ignore_patterns.contains(&pattern) {
                self.ignore_patterns.push(pattern);
                added += 1;
            }
        }
        added
    }
}

/// Serialization formats a config can be read from or exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }

    pub fn parse(self, content: &str) -> Result<WalkConfig> {
        match self {
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config"),
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON config")
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML config")
            }
        }
    }

    pub fn render(self, config: &WalkConfig) -> Result<String> {
        match self {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).context("Failed to serialize to TOML")
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(config).context("Failed to serialize to JSON")
            }
            ConfigFormat::Yaml => serde_yaml::to_string(config).context("Failed to serialize to YAML"),
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => anyhow::bail!("Unknown config format: {s}"),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Toml => write!(f, "toml"),
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Yaml => write!(f, "yaml"),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Manager for `prune-walk.toml` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_CONFIG_FILE))
    }

    /// Write a default config unless one already exists.
    pub fn initialize(&self) -> Result<()> {
        if self.config_path.exists() {
            return Ok(());
        }

        let default_config = WalkConfig::default();
        self.save_config(&default_config)?;
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        let config = self.load_config()?;
        let validator = StandardValidator::new();
        let issues = validator.validate_config(&config)?;

        if issues.is_empty() {
            return Ok(());
        }
        for issue in &issues {
            warn!(config = %self.config_path.display(), "{issue}");
        }
        anyhow::bail!(
            "Configuration validation failed with {} issue(s): {}",
            issues.len(),
            issues.join("; ")
        );
    }

    /// Add one pattern after checking that it compiles.
    pub fn add_pattern(&mut self, pattern: String) -> Result<()> {
        CompiledPattern::new(&pattern)
            .with_context(|| format!("Refusing to add invalid pattern {pattern:?}"))?;

        let mut config = self.load_config()?;
        config.merge_patterns([pattern]);
        self.save_config(&config)?;
        Ok(())
    }

    /// Remove a pattern by its exact text. Returns whether it was present.
    pub fn remove_pattern(&mut self, pattern: &str) -> Result<bool> {
        let mut config = self.load_config()?;
        let before = config.ignore_patterns.len();
        config.ignore_patterns.retain(|p| p != pattern);
        let removed = config.ignore_patterns.len() != before;

        if removed {
            self.save_config(&config)?;
        }
        Ok(removed)
    }

    pub fn list_patterns(&self) -> Result<Vec<String>> {
        Ok(self.load_config()?.ignore_patterns)
    }

    /// Merge the patterns found in another file into this config.
    pub fn import_patterns(&mut self, file_path: &Path, kind: ImportKind) -> Result<usize> {
        let mut importer = FileImporter::new();
        let patterns = importer.import_from_file(file_path, kind)?;

        let mut config = self.load_config()?;
        let added = config.merge_patterns(patterns);
        self.save_config(&config)?;
        debug!(from = %file_path.display(), added, "imported ignore patterns");
        Ok(added)
    }

    pub fn export_config(&self, file_path: &Path, format: ConfigFormat) -> Result<()> {
        let config = self.load_config()?;
        let content = format.render(&config)?;
        fs::write(file_path, content).context("Failed to write export file")?;
        Ok(())
    }

    /// Load the config and compile its patterns.
    pub fn load_patterns(&self) -> Result<(PatternSet, WalkOptions)> {
        let config = self.load_config()?;
        let patterns = config
            .compile()
            .with_context(|| format!("Invalid pattern in {}", self.config_path.display()))?;
        Ok((patterns, config.options))
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<WalkConfig>;
    fn save_config(&self, config: &WalkConfig) -> Result<()>;
    fn get_config_path(&self) -> &Path;
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<WalkConfig> {
        if !self.config_path.exists() {
            return Ok(WalkConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;
        let config = ConfigFormat::from_path(&self.config_path).parse(&content)?;
        debug!(
            config = %self.config_path.display(),
            patterns = config.ignore_patterns.len(),
            "loaded walk config"
        );
        Ok(config)
    }

    fn save_config(&self, config: &WalkConfig) -> Result<()> {
        let content = ConfigFormat::from_path(&self.config_path).render(config)?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::walker::MatchTarget;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_loads_default() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::in_dir(dir.path());
        assert_eq!(manager.load_config().unwrap(), WalkConfig::default());
        assert!(!manager.get_config_path().exists());
    }

    #[test]
    fn test_initialize_writes_default_once() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::in_dir(dir.path());
        manager.initialize().unwrap();
        assert!(dir.path().join(DEFAULT_CONFIG_FILE).exists());

        manager.add_pattern("target".to_string()).unwrap();
        manager.initialize().unwrap();
        assert_eq!(manager.list_patterns().unwrap(), vec!["target"]);
    }

    #[test]
    fn test_add_and_remove_patterns() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::in_dir(dir.path());

        manager.add_pattern("logs".to_string()).unwrap();
        manager.add_pattern(r"\.git".to_string()).unwrap();
        manager.add_pattern("logs".to_string()).unwrap();
        assert_eq!(manager.list_patterns().unwrap(), vec!["logs", r"\.git"]);

        assert!(manager.remove_pattern("logs").unwrap());
        assert!(!manager.remove_pattern("logs").unwrap());
        assert_eq!(manager.list_patterns().unwrap(), vec![r"\.git"]);
    }

    #[test]
    fn test_add_invalid_pattern_is_rejected() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::in_dir(dir.path());

        let err = manager.add_pattern("a(b".to_string()).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
        let cause = err.downcast_ref::<PatternCompileError>().unwrap();
        assert_eq!(cause.pattern, "a(b");
        assert!(manager.list_patterns().unwrap().is_empty());
    }

    #[test]
    fn test_format_chosen_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.json");
        fs::write(
            &path,
            r#"{"version": "1.0", "ignore_patterns": ["tmp"], "options": {"sort": true}}"#,
        )
        .unwrap();

        let manager = ConfigManager::new(&path);
        let config = manager.load_config().unwrap();
        assert_eq!(config.ignore_patterns, vec!["tmp"]);
        assert!(config.options.sort);
        assert_eq!(config.options.match_target, MatchTarget::RelativePath);
    }

    #[test]
    fn test_export_to_every_format() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::in_dir(dir.path());
        manager.add_pattern("build".to_string()).unwrap();

        for format in [ConfigFormat::Toml, ConfigFormat::Json, ConfigFormat::Yaml] {
            let target = dir.path().join(format!("export.{format}"));
            manager.export_config(&target, format).unwrap();
            let reloaded = ConfigManager::new(&target).load_config().unwrap();
            assert_eq!(reloaded.ignore_patterns, vec!["build"]);
        }
    }

    #[test]
    fn test_load_patterns_compiles_set() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "ignore_patterns = [\"target\", \"(oops\"]\n",
        )
        .unwrap();

        let err = ConfigManager::in_dir(dir.path()).load_patterns().unwrap_err();
        assert!(err.downcast_ref::<PatternCompileError>().is_some());
    }

    #[test]
    fn test_validate_config_reports_issues() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "version = \"1.0\"\nignore_patterns = [\".*\"]\n",
        )
        .unwrap();

        let manager = ConfigManager::in_dir(dir.path());
        let err = manager.validate_config().unwrap_err();
        assert!(err.to_string().contains("1 issue(s)"), "{err}");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("yml".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
        assert!("ini".parse::<ConfigFormat>().is_err());
    }
}
