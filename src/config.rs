//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/meldtree/meldtree.toml`
//! 3. Local config: an explicit TOML file passed by the caller
//! 4. Environment variables: `MELDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::CloneStrategy;
use crate::errors::{MeldError, MeldResult};

/// Tree rendering options for [`TreeNodeConvert`](crate::tree_traits::TreeNodeConvert).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show attributes (sorted by key)
    pub show_attributes: bool,
    /// Show text and tail content
    pub show_text: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_attributes: true,
            show_text: true,
        }
    }
}

/// Raw display config for intermediate parsing (`None` → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_attributes: Option<bool>,
    pub show_text: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub clone_strategy: Option<CloneStrategy>,
    pub display: RawDisplayConfig,
}

/// Unified configuration for meldtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Walk order used when cloning subtrees
    pub clone_strategy: CloneStrategy,
    pub display: DisplayConfig,
}

/// Get the XDG config directory for meldtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "meldtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("meldtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> MeldResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| MeldError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| MeldError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Parse a single TOML document on top of the compiled defaults.
    pub fn from_toml_str(content: &str) -> MeldResult<Self> {
        let raw: RawSettings = toml::from_str(content).map_err(|e| MeldError::Config {
            message: format!("parse: {}", e),
        })?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Overlay wins where it specifies a value, otherwise keep base.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            clone_strategy: overlay.clone_strategy.unwrap_or(self.clone_strategy),
            display: DisplayConfig {
                show_attributes: overlay
                    .display
                    .show_attributes
                    .unwrap_or(self.display.show_attributes),
                show_text: overlay.display.show_text.unwrap_or(self.display.show_text),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional TOML file applied on top of the global config.
    ///   Unlike the global file it must exist when given.
    pub fn load(local: Option<&Path>) -> MeldResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply MELDTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> MeldResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MELDTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = present(config.get_string("clone_strategy"))? {
            settings.clone_strategy = val.parse().map_err(|e| MeldError::Config {
                message: format!("MELDTREE_CLONE_STRATEGY: {}", e),
            })?;
        }
        if let Some(val) = present(config.get_bool("display.show_attributes"))? {
            settings.display.show_attributes = val;
        }
        if let Some(val) = present(config.get_bool("display.show_text"))? {
            settings.display.show_text = val;
        }

        Ok(settings)
    }
}

/// Unset keys are `None`; a set key that fails to convert is an error.
fn present<T>(value: Result<T, ConfigError>) -> MeldResult<Option<T>> {
    match value {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> MeldError {
    MeldError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_base_for_unspecified_fields() {
        let base = Settings {
            clone_strategy: CloneStrategy::BreadthFirst,
            display: DisplayConfig {
                show_attributes: false,
                show_text: true,
            },
        };
        let overlay = RawSettings {
            clone_strategy: None,
            display: RawDisplayConfig {
                show_attributes: None,
                show_text: Some(false),
            },
        };

        let merged = base.merge_with(&overlay);
        assert_eq!(merged.clone_strategy, CloneStrategy::BreadthFirst);
        assert!(!merged.display.show_attributes);
        assert!(!merged.display.show_text);
    }
}
