use crate::error::{NopackageError, Result};
use crate::naming::NamingTables;
use crate::paths::layout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const ENV_PREFIX: &str = "NOPACKAGE";
pub const HOME_ENV: &str = "NOPACKAGE_HOME";
const APP_DIR_NAME: &str = "nopackage";
const DEFAULT_PREFIX_DIR: &str = ".local";
const DEFAULT_MULTI_VERSION: &[&str] = &["blender", "godot"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NopackageConfig {
    #[serde(skip)]
    home: PathBuf,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub icons: IconsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Root of the per-user layout. Defaults to `~/.local`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    /// Programs whose versions are installed side by side.
    #[serde(default = "default_multi_version")]
    pub multi_version: Vec<String>,

    #[serde(default = "default_use_xdg_desktop_menu")]
    pub use_xdg_desktop_menu: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            multi_version: default_multi_version(),
            use_xdg_desktop_menu: default_use_xdg_desktop_menu(),
        }
    }
}

fn default_multi_version() -> Vec<String> {
    DEFAULT_MULTI_VERSION.iter().map(|s| s.to_string()).collect()
}

fn default_use_xdg_desktop_menu() -> bool {
    true
}

/// Additions to the built-in naming tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NamingConfig {
    #[serde(default)]
    pub cased_names: BTreeMap<String, String>,

    #[serde(default)]
    pub hyphenated_names: Vec<String>,

    #[serde(default)]
    pub version_keywords: Vec<String>,
}

/// Additions to the built-in icon tables, keyed by luid.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IconsConfig {
    #[serde(default)]
    pub names: BTreeMap<String, String>,

    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

impl NopackageConfig {
    /// Load `config.toml` from `home`, then apply `NOPACKAGE_*` environment
    /// variables (`__` separates nested keys, e.g. `NOPACKAGE_INSTALL__PREFIX`).
    pub fn new(home: PathBuf) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);

        let settings = config::Config::builder()
            .add_source(
                config::File::from(config_path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                NopackageError::ConfigFile(format!(
                    "Failed to read {}: {e}",
                    config_path.display()
                ))
            })?;

        let mut config: NopackageConfig = settings
            .try_deserialize()
            .map_err(|e| NopackageError::ConfigError(format!("Invalid configuration: {e}")))?;
        config.home = home;

        log::debug!("Loaded config for {:?}", config.home);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.home.join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| NopackageError::ConfigError(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn prefix(&self) -> Result<PathBuf> {
        if let Some(prefix) = &self.install.prefix {
            return Ok(prefix.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_PREFIX_DIR))
            .ok_or_else(|| {
                NopackageError::ConfigError("Unable to determine home directory".to_string())
            })
    }

    pub fn programs_dir(&self) -> Result<PathBuf> {
        Ok(layout::programs_dir(&self.prefix()?))
    }

    pub fn applications_dir(&self) -> Result<PathBuf> {
        Ok(layout::applications_dir(&self.prefix()?))
    }

    pub fn pixmaps_dir(&self) -> Result<PathBuf> {
        Ok(layout::pixmaps_dir(&self.prefix()?))
    }

    pub fn registry_path(&self) -> PathBuf {
        layout::registry_file(&self.home)
    }

    pub fn is_multi_version(&self, luid: &str) -> bool {
        self.install.multi_version.iter().any(|name| name == luid)
    }

    /// Built-in naming tables extended with the `[naming]` section.
    pub fn naming_tables(&self) -> NamingTables {
        let mut tables = NamingTables::default();
        tables.extend(
            &self.naming.cased_names,
            &self.naming.hyphenated_names,
            &self.naming.version_keywords,
        );
        tables
    }
}

/// Resolve the config home (`$NOPACKAGE_HOME` when absolute, otherwise the
/// platform config dir) and load the configuration from it.
pub fn new_nopackage_config() -> Result<NopackageConfig> {
    NopackageConfig::new(resolve_home()?)
}

fn resolve_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        let path = PathBuf::from(home);
        if path.is_absolute() {
            return Ok(path);
        }
        log::warn!("Ignoring {HOME_ENV}={path:?} because it is not an absolute path");
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| NopackageError::ConfigError("Unable to determine config directory".to_string()))
}
