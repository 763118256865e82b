//! Configuration loading.
//!
//! Settings come from an optional YAML file. Command-line flags and
//! environment variables are layered on top by the CLI.
//!
//! ```yaml
//! cache_directory: .cache
//! default_duration: 1d
//! timeout_secs: 30
//! user_agent: my-site-builder
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheDuration, DEFAULT_CACHE_DIRECTORY, DEFAULT_DURATION};
use crate::error::{AssetCacheError, Result};
use crate::fetch::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".assetcache.yml";

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding store files.
    pub cache_directory: PathBuf,
    /// Freshness window used when a request gives none.
    pub default_duration: String,
    /// Network timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            default_duration: DEFAULT_DURATION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CacheConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| AssetCacheError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetCacheError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AssetCacheError::ConfigParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            }
        })?;
        let config = Self::from_yaml(&yaml, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] inside `dir`
    /// when it exists, else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings that would only fail later.
    pub fn validate(&self) -> Result<()> {
        CacheDuration::parse(&self.default_duration)?;
        if self.timeout_secs == 0 {
            return Err(AssetCacheError::ConfigValidation {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
