use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppMenuError, Result};
use crate::menu::MenuOptions;
use crate::scan;
use crate::store::StoreOptions;

/// Overrides the config file location
pub const CONFIG_ENV: &str = "APPMENU_CONFIG";
/// Overrides the data directory, ahead of `store.data_dir`
pub const DATA_DIR_ENV: &str = "APPMENU_DATA_DIR";

const APP_DIR: &str = "appMenu";

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMenuConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default = "MenuOptions::status_bar")]
    pub status_menu: MenuOptions,
    #[serde(default = "MenuOptions::dock")]
    pub dock_menu: MenuOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where `items.json` and `state.json` live; `~` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "scan::default_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_true")]
    pub seed_on_first_run: bool,
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: scan::default_roots(),
            seed_on_first_run: true,
        }
    }
}

impl Default for AppMenuConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            scan: ScanConfig::default(),
            status_menu: MenuOptions::status_bar(),
            dock_menu: MenuOptions::dock(),
        }
    }
}

impl AppMenuConfig {
    /// Load the config file, falling back to defaults.
    ///
    /// A missing file is normal. A file that cannot be read or parsed is
    /// reported and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Strict variant of [`AppMenuConfig::load`] for a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppMenuError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            AppMenuError::config(format!("invalid TOML in {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `$APPMENU_CONFIG`, else `<config dir>/appmenu/config.toml`
    pub fn config_path() -> PathBuf {
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("appmenu")
            .join("config.toml")
    }

    /// Write the config to [`AppMenuConfig::config_path`]
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppMenuError::config(format!("cannot serialize config: {}", e)))
    }

    fn validate(&self) -> Result<()> {
        if self.store.debounce_ms == 0 {
            return Err(AppMenuError::config("store.debounce_ms must be greater than zero"));
        }
        Ok(())
    }

    /// `$APPMENU_DATA_DIR`, else `store.data_dir`, else `<data dir>/appMenu`
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.resolve_data_dir(env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve_data_dir(&self, env_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = env_override.filter(|dir| !dir.as_os_str().is_empty()) {
            return Ok(expand_home(&dir));
        }
        if let Some(dir) = &self.store.data_dir {
            return Ok(expand_home(dir));
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(AppMenuError::DataDir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.store.debounce_ms)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            debounce: self.debounce(),
            scan_roots: self.scan.roots.iter().map(|root| expand_home(root)).collect(),
            seed: self.scan.seed_on_first_run,
        }
    }
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
