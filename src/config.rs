//! Configuration file loading and parsing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "sgweave.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root of the project source tree.
    #[serde(default = "default_source_root")]
    pub source_root: String,

    /// When set, the source tree is copied here and the copies are rewritten.
    /// When absent, files are rewritten in place under `source_root`.
    #[serde(default)]
    pub output_root: Option<String>,

    /// Directories (or glob patterns) under the root to scan. Empty means
    /// the whole tree.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Paths or glob patterns to skip during discovery.
    #[serde(default)]
    pub ignores: Vec<String>,
}

fn default_source_root() -> String {
    "./".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            output_root: None,
            includes: Vec::new(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }
        Ok(())
    }
}

/// Load configuration from an explicit path, or from `sgweave.json` in the
/// current directory, falling back to defaults when no file exists.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(CONFIG_FILE_NAME),
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Serialized default configuration, written by `sgweave init`.
pub fn default_config_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(&Config::default())?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source_root, "./");
        assert_eq!(config.output_root, None);
        assert!(config.includes.is_empty());
        assert!(config.ignores.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{ "sourceRoot": "src", "ignores": ["**/dist/**"], "outputRoot": "build" }"#,
        )
        .unwrap();
        assert_eq!(config.source_root, "src");
        assert_eq!(config.output_root.as_deref(), Some("build"));
        assert_eq!(config.ignores, vec!["**/dist/**"]);
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = Config {
            ignores: vec!["[".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.source_root, Config::default().source_root);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.source_root, "./");
    }
}
