// src/infrastructure/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::application::SortMode;
use crate::constants::{APP_DIR_NAME, EMPTY_STATE_HTML};
use crate::infrastructure::markdown::RenderOptions;

const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_FILE_NAME: &str = "store.json";

/// TOML configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct StoreConfig {
    /// Empty means the platform data directory
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    #[serde(default = "default_escape_raw_html")]
    pub escape_raw_html: bool,
    #[serde(default = "default_empty_state_html")]
    pub empty_state_html: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct TreeConfig {
    #[serde(default)]
    pub sort: SortMode,
}

fn default_escape_raw_html() -> bool { true }
fn default_empty_state_html() -> String { EMPTY_STATE_HTML.to_string() }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            escape_raw_html: default_escape_raw_html(),
            empty_state_html: default_empty_state_html(),
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        RenderOptions {
            escape_raw_html: config.escape_raw_html,
            empty_state_html: config.empty_state_html.clone(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Explicit path, else the user config file if present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(?path, "Loading config from explicit path");
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                debug!(?path, "Loading user config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Store file: configured path, else `<data dir>/nexus-study/store.json`.
    pub fn store_path(&self) -> Result<PathBuf> {
        if !self.store.path.is_empty() {
            return Ok(PathBuf::from(&self.store.path));
        }
        let data_dir = dirs::data_dir().context("Could not find data directory")?;
        Ok(data_dir.join(APP_DIR_NAME).join(STORE_FILE_NAME))
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from(&self.render)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_no_file_when_creating_default_then_creates_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config = Config::create_default(&config_path).unwrap();

        assert!(config.render.escape_raw_html);
        assert_eq!(config.render.empty_state_html, EMPTY_STATE_HTML);
        assert_eq!(config.tree.sort, SortMode::Updated);
        assert!(config_path.exists());
    }

    #[test]
    fn given_config_when_saving_then_writes_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let config = Config::default();
        config.save(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[store]"));
        assert!(content.contains("[render]"));
        assert!(content.contains("[tree]"));
    }

    #[test]
    fn given_toml_file_when_loading_then_reads_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("load_test.toml");

        let toml_content = r#"
[store]
path = "/data/study.json"

[render]
escape_raw_html = false
empty_state_html = "<p>empty</p>"

[tree]
sort = "title"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.store_path().unwrap(), PathBuf::from("/data/study.json"));
        assert!(!config.render.escape_raw_html);
        assert_eq!(config.render_options().empty_state_html, "<p>empty</p>");
        assert_eq!(config.tree.sort, SortMode::Title);
    }

    #[test]
    fn given_partial_toml_when_loading_then_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");

        let toml_content = r#"
[tree]
sort = "title"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        // Specified value
        assert_eq!(config.tree.sort, SortMode::Title);
        // Default values
        assert_eq!(config.store.path, "");
        assert!(config.render.escape_raw_html);
    }

    #[test]
    fn given_unknown_sort_when_loading_then_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[tree]\nsort = \"random\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
    }

    #[test]
    fn given_nonexistent_file_when_loading_then_returns_error() {
        let result = Config::load("/nonexistent/path/config.toml");

        assert!(result.is_err());
    }

    #[test]
    fn given_explicit_path_when_discovering_then_loads_it() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("explicit.toml");
        fs::write(&config_path, "[store]\npath = \"x.json\"\n").unwrap();

        let config = Config::discover(Some(config_path.as_path())).unwrap();

        assert_eq!(config.store.path, "x.json");
    }

    #[test]
    fn given_round_trip_when_saving_and_loading_then_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("roundtrip.toml");

        let original = Config {
            store: StoreConfig {
                path: "/tmp/store.json".to_string(),
            },
            render: RenderConfig {
                escape_raw_html: false,
                ..Default::default()
            },
            tree: TreeConfig {
                sort: SortMode::Title,
            },
        };

        original.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded, original);
    }
}
