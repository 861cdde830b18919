//! Layered configuration for sharehub.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. `sharehub.toml` in the platform configuration directory,
//! 3. an explicitly requested file (TOML, YAML or JSON, picked by extension),
//! 4. `SHAREHUB_*` environment variables, with `__` separating sections
//!    (`SHAREHUB_STORAGE__SLOT=demo`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APPLICATION: &str = "sharehub";
const CONFIG_FILE: &str = "sharehub.toml";
const ENV_PREFIX: &str = "SHAREHUB_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub gallery: GalleryConfig,
    pub log: LogConfig,
}

/// Where the record list is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the key-value slots. Defaults to the platform data
    /// directory.
    pub path: Option<PathBuf>,
    /// Key the record list is stored under.
    pub slot: String,
}
impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            slot: "uploadedFiles".to_string(),
        }
    }
}
impl StorageConfig {
    /// The configured directory, or the platform data directory. Relative
    /// paths are resolved against the current directory.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => ProjectDirs::from("", "", APPLICATION)
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_raise(|| ErrorKind::NoDataDirectory)?,
        };
        if path.is_absolute() {
            return Ok(path);
        }
        let cwd = std::env::current_dir().map_err(|_| ErrorKind::NoDataDirectory)?;
        Ok(cwd.join(path))
    }
}

/// Cosmetic timings of the upload flow. None of them affect the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Interval between simulated progress steps.
    pub progress_tick_ms: u64,
    /// Percentage added on each tick.
    pub progress_step: u8,
    /// Simulated progress never passes this before encoding finishes.
    pub progress_cap: u8,
    /// Pause at 100% before the record is added.
    pub completion_delay_ms: u64,
    /// How long the success notice stays up.
    pub success_notice_ms: u64,
}
impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            progress_tick_ms: 100,
            progress_step: 10,
            progress_cap: 90,
            completion_delay_ms: 500,
            success_notice_ms: 3000,
        }
    }
}
impl UploadConfig {
    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    pub fn success_notice(&self) -> Duration {
        Duration::from_millis(self.success_notice_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Length of the "removing" transition before a record is deleted.
    pub delete_delay_ms: u64,
}
impl Default for GalleryConfig {
    fn default() -> Self {
        Self { delete_delay_ms: 300 }
    }
}
impl GalleryConfig {
    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Location of the implicit configuration file, if the platform has a
    /// configuration directory.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load configuration from every source, with `explicit` layered above
    /// the implicit file. An explicit file must exist; the implicit one may
    /// not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(implicit) = Self::default_file() {
            figment = figment.merge(Toml::file(implicit));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::FileNotFound(path.to_path_buf()));
            }
            figment = Self::merge_file(figment, path);
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    /// Extract and validate a configuration from an already assembled
    /// [`Figment`].
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.slot.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "storage.slot",
                reason: "must not be empty",
            });
        }
        sharehub_storage::validate_key(&self.storage.slot).or_raise(|| ErrorKind::Invalid {
            field: "storage.slot",
            reason: "must only use ASCII letters, digits, '-', '_' or '.' and not start with '.'",
        })?;
        if self.upload.progress_step == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "upload.progress_step",
                reason: "must be at least 1",
            });
        }
        if self.upload.progress_cap >= 100 {
            exn::bail!(ErrorKind::Invalid {
                field: "upload.progress_cap",
                reason: "must stay below 100; only a finished upload reaches 100%",
            });
        }
        Ok(())
    }
}
