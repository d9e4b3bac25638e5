//! Global eventdir configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{EventDirError, EventDirResult};
use crate::grid::{DEFAULT_MONTH_CELL_CAPACITY, DEFAULT_PALETTE_SIZE, GridOptions};

const ENV_PREFIX: &str = "EVENTDIR";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4096";

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_palette_size() -> usize {
    DEFAULT_PALETTE_SIZE
}

fn default_month_cell_capacity() -> usize {
    DEFAULT_MONTH_CELL_CAPACITY
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

/// Configuration at ~/.config/eventdir/config.toml, overridable with
/// `EVENTDIR_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventDirConfig {
    /// Base URL of the hosted record store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_palette_size")]
    pub palette_size: usize,

    #[serde(default = "default_month_cell_capacity")]
    pub month_cell_capacity: usize,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for EventDirConfig {
    fn default() -> Self {
        EventDirConfig {
            store_url: None,
            api_key: None,
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            palette_size: default_palette_size(),
            month_cell_capacity: default_month_cell_capacity(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl EventDirConfig {
    pub fn config_path() -> EventDirResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventDirError::Config("Could not determine config directory".into()))?
            .join("eventdir");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented template on first run.
    pub fn load() -> EventDirResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load `path` (which may be missing) with the environment layered on top.
    pub fn load_from(path: &Path) -> EventDirResult<Self> {
        let config: EventDirConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| EventDirError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventDirError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EventDirResult<()> {
        if self.palette_size == 0 {
            return Err(EventDirError::Config("palette_size must be at least 1".into()));
        }
        if self.month_cell_capacity == 0 {
            return Err(EventDirError::Config(
                "month_cell_capacity must be at least 1".into(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(EventDirError::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(EventDirError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            palette_size: self.palette_size,
            month_cell_capacity: self.month_cell_capacity,
        }
    }

    /// The effective values as TOML, with the api key masked.
    pub fn to_display_toml(&self) -> EventDirResult<String> {
        let mut shown = self.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("********".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| EventDirError::Serialization(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventDirResult<()> {
        let contents = format!(
            "\
# eventdir configuration
# Every key can also be set as an environment variable, e.g. EVENTDIR_STORE_URL.

# Hosted record store:
# store_url = \"https://your-project.supabase.co\"
# api_key = \"public-anon-key\"

# How often to check the store for changes, and how long a request may take:
# poll_interval_secs = {}
# request_timeout_secs = {}

# Calendar rendering:
# palette_size = {}
# month_cell_capacity = {}

# Address for eventdir-server:
# listen_addr = \"{}\"
",
            default_poll_interval_secs(),
            default_request_timeout_secs(),
            DEFAULT_PALETTE_SIZE,
            DEFAULT_MONTH_CELL_CAPACITY,
            DEFAULT_LISTEN_ADDR,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventDirError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventDirError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventdir").join("config.toml");
        EventDirConfig::create_default_config(&path).unwrap();

        let config = EventDirConfig::load_from(&path).unwrap();

        assert_eq!(config, EventDirConfig::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "store_url = \"https://db.example.com\"\nmonth_cell_capacity = 5\n",
        )
        .unwrap();

        let config = EventDirConfig::load_from(&path).unwrap();

        assert_eq!(config.store_url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.grid_options().month_cell_capacity, 5);
        assert_eq!(config.grid_options().palette_size, DEFAULT_PALETTE_SIZE);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EventDirConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_zero_palette_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "palette_size = 0\n").unwrap();

        assert!(matches!(
            EventDirConfig::load_from(&path),
            Err(EventDirError::Config(_))
        ));
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for contents in ["poll_interval_secs = 0\n", "request_timeout_secs = 0\n"] {
            std::fs::write(&path, contents).unwrap();
            assert!(matches!(
                EventDirConfig::load_from(&path),
                Err(EventDirError::Config(_))
            ));
        }
    }

    #[test]
    fn test_display_masks_api_key() {
        let config = EventDirConfig {
            api_key: Some("secret".into()),
            ..EventDirConfig::default()
        };

        let shown = config.to_display_toml().unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("listen_addr"));
    }
}
