//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub relay: RelayConfig,
    pub scanner: ScannerConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Backend HTTP API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Notification relay (websocket) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    pub url: String,
    pub capacity: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Consecutive failed connects before giving up; 0 retries forever
    pub max_attempts: u32,
}

/// QR scanner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    pub location_timeout_seconds: u64,
    pub platform_fallback: String,
}

/// Attendance session issuing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub allowed_durations: Vec<u32>,
    pub default_duration: u32,
}

/// Credential persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub credentials_path: String,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub translations_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("PRESENSI").prefix_separator("_").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::AttendanceError> {
        super::validation::validate_settings(self)
    }

    /// Render the settings as TOML, suitable for a `config.toml`
    pub fn to_toml(&self) -> Result<String, crate::utils::errors::AttendanceError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::utils::errors::AttendanceError::Config(e.to_string()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                timeout_seconds: 15,
                user_agent: format!("Presensi/{}", env!("CARGO_PKG_VERSION")),
            },
            relay: RelayConfig {
                url: "ws://localhost:8080/ws".to_string(),
                capacity: 50,
                initial_backoff_ms: 1_000,
                max_backoff_ms: 30_000,
                max_attempts: 0,
            },
            scanner: ScannerConfig {
                location_timeout_seconds: 5,
                platform_fallback: "Mobile App".to_string(),
            },
            session: SessionConfig {
                allowed_durations: vec![15, 30, 45, 60, 90, 120],
                default_duration: 30,
            },
            auth: AuthConfig {
                credentials_path: ".presensi/credentials.json".to_string(),
            },
            i18n: I18nConfig {
                default_language: "id".to_string(),
                supported_languages: vec!["id".to_string(), "en".to_string()],
                translations_path: "translations".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
