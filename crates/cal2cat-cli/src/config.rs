//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use cal2cat_core::{DurationFormat, Mapper, PatternError, TimeFormat};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Commented config written by `cal2cat init`.
pub const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// Config file looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "cal2cat.toml";

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output settings.
    #[serde(default)]
    pub settings: Settings,

    /// Calendar locations, local paths or URLs.
    #[serde(default)]
    pub calendars: Vec<String>,

    /// Ordered pattern to category rules; the first match wins.
    #[serde(default)]
    pub mapping: Vec<MappingRule>,
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// strftime layout for timestamps.
    #[serde(default)]
    pub time_format: TimeFormat,

    /// `hours`, `minutes` or a strftime layout.
    #[serde(default)]
    pub duration_format: DurationFormat,
}

/// Assigns events whose summary matches `pattern` to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub pattern: String,
    pub category: String,
}

// Calendar URLs often embed private access tokens, so only their count is shown.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("calendars", &self.calendars.len())
            .field("mapping", &self.mapping)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(path) = default_config_file() {
            figment = figment.merge(Toml::file(path));
        }

        // Load from the working directory
        figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CAL2CAT_*)
        figment = figment.merge(Env::prefixed("CAL2CAT_").split("__"));

        figment.extract()
    }

    /// Builds the mappers in configuration order.
    pub fn mappers(&self) -> Result<Vec<Mapper>, PatternError> {
        self.mapping
            .iter()
            .map(|rule| Mapper::new(&rule.pattern, rule.category.as_str()))
            .collect()
    }
}

/// Returns the platform-specific config directory for cal2cat.
///
/// On Linux: `~/.config/cal2cat`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cal2cat"))
}

/// Returns the default config file path.
pub fn default_config_file() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}
