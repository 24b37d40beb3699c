//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: `herald.toml`
//! - `yaml-config`: `herald.yaml` / `herald.yml`
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Configuration file (an explicit [`ConfigLoader::file`], or the first
//!    `herald.*` found in the search paths)
//! 3. Environment variables (`HERALD_*`)
//! 4. Programmatic overrides ([`ConfigLoader::merge`])
//!
//! When no search path is given, the current directory is searched first,
//! then `<user config dir>/herald`.
//!
//! # Environment Variable Mapping
//!
//! Variables use the `HERALD_` prefix with `__` as the nesting separator:
//!
//! - `HERALD_BOT__PREFIX=?` → `bot.prefix = "?"`
//! - `HERALD_BOT__OWNER_ID=42` → `bot.owner_id = "42"`
//! - `HERALD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/herald.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::HeraldConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "HERALD_";

#[cfg(feature = "toml-config")]
const TOML_NAMES: &[&str] = &["herald.toml"];
#[cfg(feature = "yaml-config")]
const YAML_NAMES: &[&str] = &["herald.yaml", "herald.yml"];

/// Layered configuration loader.
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    load_env: bool,
    overrides: Vec<HeraldConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that searches the default locations and reads the
    /// environment.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
            overrides: Vec::new(),
        }
    }

    /// Adds a search path for configuration files.
    ///
    /// Setting any search path replaces the default locations.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads this file instead of searching.  It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables `HERALD_*` environment variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignores the environment.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a configuration on top of every other source.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.overrides.push(config);
        self
    }

    /// Loads, extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<HeraldConfig> {
        let config: HeraldConfig = self.build_figment()?.extract()?;
        validate_config(&config)?;

        debug!(
            prefix = %config.bot.prefix,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(HeraldConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, path)?;
        } else if let Some(path) = self.find_config_file() {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_config_file(figment, &path)?;
        } else {
            debug!("No configuration file found, using defaults");
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        for config in self.overrides {
            figment = figment.merge(Serialized::defaults(config));
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("herald"));
        }
        paths
    }

    /// First existing `herald.*` file, search path by search path.
    fn find_config_file(&self) -> Option<PathBuf> {
        #[allow(unused_mut)]
        let mut names: Vec<&str> = Vec::new();
        #[cfg(feature = "toml-config")]
        names.extend_from_slice(TOML_NAMES);
        #[cfg(feature = "yaml-config")]
        names.extend_from_slice(YAML_NAMES);

        self.resolve_search_paths().into_iter().find_map(|dir| {
            names
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Merges a single config file, dispatching on its extension.
fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
