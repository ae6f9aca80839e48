//! Layered configuration loading.
//!
//! Sources, lowest to highest priority:
//!
//! ```text
//! HeraldConfig::default()
//!   └─ ConfigLoader::merge(..)          programmatic overrides
//!       └─ herald.toml / herald.yaml    first directory that has one
//!           └─ herald.{profile}.toml    HERALD_PROFILE or ConfigLoader::profile
//!               └─ HERALD_* env         `__` separates nested keys
//! ```
//!
//! Files are looked up in the working directory, then in the user config
//! directory (`~/.config/herald` on Linux). TOML needs the `toml-config`
//! feature and YAML the `yaml-config` feature.
//!
//! `HERALD_DISPATCH__QUEUE_CAPACITY=64` sets `dispatch.queue_capacity`, and
//! `HERALD_INTENTS=[GUILDS,GUILD_MESSAGES]` sets `intents`.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
use figment::providers::{Env, Serialized};
use tracing::{debug, info};

use super::error::{ConfigError, ConfigResult};
use super::schema::HeraldConfig;
use super::validation::validate_config;

/// Base file names, in lookup order.
const FILE_NAMES: &[&str] = &[
    #[cfg(feature = "toml-config")]
    "herald.toml",
    #[cfg(feature = "yaml-config")]
    "herald.yaml",
];

/// Builds a [`HeraldConfig`] from defaults, files and the environment.
pub struct ConfigLoader {
    figment: Figment,
    file: Option<PathBuf>,
    profile: Option<String>,
    env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(HeraldConfig::default())),
            file: None,
            profile: std::env::var("HERALD_PROFILE").ok(),
            env: true,
        }
    }

    /// Overlays `config` on the defaults. Files and the environment still win.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Also loads `herald.{name}.*` next to the base file.
    pub fn profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Ignores `HERALD_*` variables.
    pub fn without_env(mut self) -> Self {
        self.env = false;
        self
    }

    pub fn load(self) -> ConfigResult<HeraldConfig> {
        let files = match &self.file {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path.clone())),
            Some(path) => vec![path.clone()],
            None => self.discover(),
        };

        let mut figment = self.figment;
        for path in &files {
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, path)?;
        }
        if self.env {
            figment = figment.merge(Env::prefixed("HERALD_").ignore(&["PROFILE"]).split("__"));
        }

        let config: HeraldConfig = figment.extract()?;
        validate_config(&config)?;

        debug!(
            files = files.len(),
            intents = config.intents.len(),
            queue_capacity = config.dispatch.queue_capacity,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Base file plus profile file from the first directory holding a base file.
    fn discover(&self) -> Vec<PathBuf> {
        let dirs = std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("herald")));

        for dir in dirs {
            for &name in FILE_NAMES {
                let base = dir.join(name);
                if !base.exists() {
                    continue;
                }
                let mut files = vec![base];
                if let Some(profile) = &self.profile {
                    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
                    let overlay = dir.join(format!("{stem}.{profile}.{ext}"));
                    if overlay.exists() {
                        files.push(overlay);
                    }
                }
                return files;
            }
        }

        debug!("No configuration file found");
        Vec::new()
    }
}

#[cfg_attr(
    not(any(feature = "toml-config", feature = "yaml-config")),
    allow(unused_variables)
)]
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(figment::providers::Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(figment::providers::Yaml::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().file(path).load()
}
