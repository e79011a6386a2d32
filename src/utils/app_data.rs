use crate::config::EngineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "gramdex";
const CONFIG_FILE: &str = "config.json";
const INDEX_FILE: &str = "index.json";

/// CLI configuration stored in the app data directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settings for newly created indexes
    #[serde(default)]
    pub engine: EngineConfig,

    /// Index file to use when `--index` is not given
    #[serde(default)]
    pub index_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load config from an explicit path, or return default if not found
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        config.engine.validate().context("Invalid engine configuration")?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;
        Ok(())
    }

    /// Resolve the index file: explicit flag, then config, then app data dir
    pub fn index_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match flag.or(self.index_file.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(get_app_data_dir()?.join(INDEX_FILE)),
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}
