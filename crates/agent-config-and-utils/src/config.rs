//! Configuration management for the agent.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Object path the agent object is exported at on the system bus.
pub const DEFAULT_OBJECT_PATH: &str = "/org/freedesktop/PolicyKit1/AuthenticationAgent";

/// Locale sent to the authority when `LANG` is unset.
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";

/// Main agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Object path for the exported authentication agent.
    pub object_path: String,
    /// Locale reported at registration. `None` means "derive from LANG".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Register as a fallback agent (only used when no other agent exists).
    pub fallback: bool,
    /// Color the authentication banners on the terminal.
    pub highlight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            locale: None,
            fallback: false,
            highlight: true,
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    ///
    /// Not validated here: command-line overrides still apply on top, so
    /// callers run [`validate`](Self::validate) on the merged result.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check values the bus would reject later with a less helpful error.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.object_path.starts_with('/') {
            return Err(CoreError::Config(format!(
                "object_path must be an absolute D-Bus object path, got `{}`",
                self.object_path
            )));
        }
        Ok(())
    }

    /// Locale to register with: the configured one, else `LANG`, else
    /// [`DEFAULT_LOCALE`].
    pub fn locale(&self) -> String {
        self.locale
            .clone()
            .filter(|locale| !locale.trim().is_empty())
            .unwrap_or_else(default_locale)
    }

    /// Only log_level can be overridden from the environment.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("RACE_AGENT_LOG_LEVEL") {
            if !log_level.trim().is_empty() {
                self.log_level = log_level;
            }
        }
    }
}

/// Locale derived from `LANG`, falling back to [`DEFAULT_LOCALE`].
pub fn default_locale() -> String {
    locale_from_lang(std::env::var("LANG").ok())
}

fn locale_from_lang(lang: Option<String>) -> String {
    lang.filter(|lang| !lang.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}
