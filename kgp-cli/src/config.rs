// ABOUTME: Configuration file loading, validation, and hierarchical merging for kgp
// ABOUTME: Supports TOML config files with XDG Base Directory specification compliance

use crate::cli::{MediumChoice, PlaceholderMode};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default, deserialize_with = "validate_medium")]
    pub transmission_medium: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default, deserialize_with = "validate_placeholder")]
    pub unicode_placeholder: Option<String>,
    #[serde(default)]
    pub max_cols: Option<u32>,
    #[serde(default)]
    pub max_rows: Option<u32>,
    #[serde(default)]
    pub png: Option<bool>,
}

impl Config {
    /// Load configuration from standard XDG-compliant locations
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        Self::load_from_paths(&paths.iter().map(|p| p.as_str()).collect::<Vec<_>>())
    }

    /// Load configuration from specific file paths in order of precedence
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        // Highest precedence first, so earlier files override later ones
        for path in paths.iter().rev() {
            if !Path::new(path).is_file() {
                continue;
            }
            let file_config = Self::load_from_file(path)?;
            config = config.merge(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Get standard config file paths in order of precedence (highest first)
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        // 1. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("kgp.toml").to_string_lossy().to_string());
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home).join("kgp").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        // 3. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir.join(".config").join("kgp").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            transmission_medium: other.transmission_medium.or(self.transmission_medium),
            chunk_size: other.chunk_size.or(self.chunk_size),
            unicode_placeholder: other.unicode_placeholder.or(self.unicode_placeholder),
            max_cols: other.max_cols.or(self.max_cols),
            max_rows: other.max_rows.or(self.max_rows),
            png: other.png.or(self.png),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == Some(0) {
            return Err(anyhow!("chunk_size must be a positive integer"));
        }
        Ok(())
    }

    pub fn medium(&self) -> Result<Option<MediumChoice>> {
        self.transmission_medium
            .as_deref()
            .map(MediumChoice::parse)
            .transpose()
            .context("Invalid transmission_medium in config")
    }

    pub fn placeholder_mode(&self) -> Result<Option<PlaceholderMode>> {
        self.unicode_placeholder
            .as_deref()
            .map(PlaceholderMode::parse)
            .transpose()
            .context("Invalid unicode_placeholder in config")
    }
}

// Custom deserializer for medium validation
fn validate_medium<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;

    if let Some(ref medium) = value {
        MediumChoice::parse(medium).map_err(|_| {
            D::Error::custom(format!(
                "Invalid transmission medium '{}'. Must be one of: auto, direct, shared-memory, temp-file",
                medium
            ))
        })?;
    }
    Ok(value)
}

// Custom deserializer for placeholder mode validation
fn validate_placeholder<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;

    if let Some(ref mode) = value {
        PlaceholderMode::parse(mode).map_err(|e| D::Error::custom(e.to_string()))?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.transmission_medium.is_none());
        assert!(config.chunk_size.is_none());
        assert_eq!(config.medium().unwrap(), None);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config {
            transmission_medium: Some("direct".to_string()),
            chunk_size: Some(1024),
            ..Default::default()
        };

        let override_config = Config {
            transmission_medium: Some("temp-file".to_string()),
            max_cols: Some(40),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.transmission_medium, Some("temp-file".to_string()));
        assert_eq!(merged.chunk_size, Some(1024));
        assert_eq!(merged.max_cols, Some(40));
    }

    #[test]
    fn test_zero_chunk_size_is_invalid() {
        let config = Config {
            chunk_size: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let config = Config {
            transmission_medium: Some("shm".to_string()),
            unicode_placeholder: Some("on".to_string()),
            ..Default::default()
        };
        assert_eq!(config.medium().unwrap(), Some(MediumChoice::SharedMemory));
        assert_eq!(config.placeholder_mode().unwrap(), Some(PlaceholderMode::On));
    }
}
