use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "po-autotranslate.toml";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "PO_AUTOTRANSLATE_CONFIG";

fn default_locale_dir() -> PathBuf {
    PathBuf::from("locale")
}

fn default_catalog_name() -> String {
    "django.po".to_string()
}

fn default_target_locales() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string()]
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_preview_chars() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Run configuration shared by the catalog updater and the run driver.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_locale_dir")]
    pub locale_dir: PathBuf,

    #[serde(default = "default_catalog_name")]
    pub catalog_name: String,

    #[serde(default = "default_target_locales")]
    pub target_locales: Vec<String>,

    /// Language assumed when detection is inconclusive. Must be one of `target_locales`.
    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locale_dir: default_locale_dir(),
            catalog_name: default_catalog_name(),
            target_locales: default_target_locales(),
            default_language: default_language(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            preview_chars: default_preview_chars(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads the config from `$PO_AUTOTRANSLATE_CONFIG`, then `./po-autotranslate.toml`,
    /// falling back to the built-in defaults when neither is present.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&explicit));
        }

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }

        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_locales.is_empty() {
            return Err(ConfigError::Invalid(
                "target_locales must name at least one locale".into(),
            ));
        }

        if let Some(bad) = self.target_locales.iter().find(|l| l.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "target_locales contains an empty code: {bad:?}"
            )));
        }

        if self.catalog_name.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog_name must not be empty".into()));
        }

        if !self.target_locales.iter().any(|l| l == &self.default_language) {
            return Err(ConfigError::Invalid(format!(
                "default_language {:?} is not one of target_locales {:?}",
                self.default_language, self.target_locales
            )));
        }

        Ok(())
    }

    /// `<locale_dir>/<locale>/LC_MESSAGES/<catalog_name>`
    pub fn catalog_path(&self, locale: &str) -> PathBuf {
        self.locale_dir
            .join(locale)
            .join("LC_MESSAGES")
            .join(&self.catalog_name)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
