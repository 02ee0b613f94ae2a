//! TOML configuration for the estimator.
//!
//! Every section and key is optional; a missing file yields [`AppConfig::default`].
//!
//! ```toml
//! [logging]
//! level = "debug"
//! file = "lease-estimator.log"
//!
//! [feeds]
//! federal = "feeds/federal.json"
//! state = "feeds/state.json"
//! timeout_secs = 10
//!
//! [tables]
//! dir = "tables"
//! model_year_ceiling = 2027
//!
//! [defaults]
//! tier = "tier1"
//! mileage = "12K"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local};
use lease_core::{CreditTier, MileageAllowance};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub feeds: FeedConfig,
    pub tables: TablesConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub federal: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            federal: None,
            state: None,
            timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// True when at least one feed source is configured.
    pub fn any(&self) -> bool {
        self.federal.is_some() || self.state.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    pub dir: Option<PathBuf>,
    pub model_year_ceiling: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub tier: String,
    pub mileage: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tier: CreditTier::default().as_str().to_string(),
            mileage: "12K".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or returns defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "feeds.timeout_secs must be at least 1".to_string(),
            ));
        }
        self.default_tier()?;
        self.default_mileage()?;
        Ok(())
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feeds.timeout_secs)
    }

    /// Configured ceiling, or the calendar year after today.
    pub fn model_year_ceiling(&self) -> i32 {
        self.tables
            .model_year_ceiling
            .unwrap_or_else(|| Local::now().year() + 1)
    }

    pub fn default_tier(&self) -> Result<CreditTier, ConfigError> {
        CreditTier::parse(&self.defaults.tier).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown credit tier '{}'", self.defaults.tier))
        })
    }

    pub fn default_mileage(&self) -> Result<MileageAllowance, ConfigError> {
        MileageAllowance::parse(&self.defaults.mileage).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown mileage '{}'", self.defaults.mileage))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.feed_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_tier().unwrap(), CreditTier::Tier1);
        assert_eq!(config.default_mileage().unwrap(), MileageAllowance(12000));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str("[feeds]\nstate = \"state.json\"\n").unwrap();

        assert_eq!(config.feeds.state, Some(PathBuf::from("state.json")));
        assert_eq!(config.feeds.federal, None);
        assert_eq!(config.feeds.timeout_secs, 10);
        assert!(config.feeds.any());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AppConfig::from_toml_str("[feeds]\ntimeout_secs = 0\n").unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_tier_is_rejected() {
        let err = AppConfig::from_toml_str("[defaults]\ntier = \"gold\"\n").unwrap_err();

        assert!(err.to_string().contains("gold"));
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[logging]\nlevle = \"debug\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn configured_ceiling_wins() {
        let config = AppConfig::from_toml_str("[tables]\nmodel_year_ceiling = 2020\n").unwrap();

        assert_eq!(config.model_year_ceiling(), 2020);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }
}
