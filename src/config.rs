use serde::{Deserialize, Serialize};

use crate::utils::get_env_with_prefix;

/// Configuration for plan limit enforcement
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub enforcement: EnforcementConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnforcementConfig {
    /// When `false`, denials are logged but the operation is allowed
    /// (shadow mode). Useful while rolling out a new catalog.
    #[serde(default = "default_enforce")]
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: default_enforce(),
        }
    }
}

impl EnforcementConfig {
    /// Log denials without rejecting anything.
    pub fn shadow() -> Self {
        Self { enabled: false }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_enforce() -> bool {
    true
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    pub fn with_enforcement(mut self, enabled: bool) -> Self {
        self.config.enforcement.enabled = enabled;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `LOG_LEVEL`, `LOG_JSON` and `LIMITS_ENFORCE`, each with the
    /// `VEX_` prefix taking precedence over the bare name. Unparseable
    /// values keep the current setting.
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }

        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            if let Ok(val) = json.parse() {
                self.config.logging.json = val;
            }
        }

        if let Some(enforce) = get_env_with_prefix("LIMITS_ENFORCE") {
            if let Ok(val) = enforce.parse() {
                self.config.enforcement.enabled = val;
            }
        }

        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
