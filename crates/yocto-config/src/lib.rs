//! Client configuration for Yoctoprint.
//!
//! Reads `~/.yoctoprint/client.yaml`. Every field has a default, so an empty
//! or partial file is valid:
//!
//! ```yaml
//! host: octopi.local
//! poll_interval_ms: 1000
//! channel_capacity: 16
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use yocto_core::{Result, YoctoError};

/// Config file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "client.yaml";

/// Default delay between the end of one status request and the next one.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default number of updates buffered per subscriber.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Config file path (typically ~/.yoctoprint/client.yaml).
pub fn config_path() -> Result<PathBuf> {
    Ok(yocto_core::logging::data_dir()?.join(CONFIG_FILE_NAME))
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host name of the printer host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Delay between status requests, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Updates buffered per status subscriber before it starts skipping.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            poll_interval_ms: default_poll_interval(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl ClientConfig {
    /// Load configuration from the default path.
    ///
    /// A missing file is not an error and yields `Ok(None)`.
    pub fn load() -> Result<Option<Self>> {
        let path = config_path()?;
        if !path.exists() {
            debug!("Config file does not exist: {:?}", path);
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load and validate configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                YoctoError::config_not_found_with_source(path, e)
            } else {
                YoctoError::io("reading config", path, e)
            }
        })?;

        let config = Self::parse(&content).map_err(|message| YoctoError::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;

        debug!(path = %path.display(), host = %config.host, "loaded client config");
        Ok(config)
    }

    /// Parse configuration from a YAML string. An empty document yields defaults.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<ClientConfig>(content).map_err(|e| e.to_string())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(YoctoError::config_validation("host must not be empty"));
        }

        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(YoctoError::config_validation(format!(
                "poll_interval_ms must be >= {}, got {}",
                MIN_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.channel_capacity == 0 {
            return Err(YoctoError::config_validation(
                "channel_capacity must be >= 1",
            ));
        }

        Ok(())
    }

    /// Override the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the poll interval.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}
