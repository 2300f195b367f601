//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;
use crate::models::session::SessionDuration;
use crate::utils::errors::{AttendanceError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_relay_config(&settings.relay)?;
    validate_scanner_config(&settings.scanner)?;
    validate_session_config(&settings.session)?;
    validate_auth_config(&settings.auth)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

fn parse_url_with_scheme(raw: &str, schemes: &[&str], what: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(AttendanceError::Config(format!("{} is required", what)));
    }

    let url = Url::parse(raw)?;
    if !schemes.contains(&url.scheme()) {
        return Err(AttendanceError::Config(format!(
            "{} must use one of {:?}, got {}",
            what,
            schemes,
            url.scheme()
        )));
    }

    Ok(url)
}

/// Validate backend API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    parse_url_with_scheme(&config.base_url, &["http", "https"], "API base URL")?;

    if config.timeout_seconds == 0 {
        return Err(AttendanceError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate notification relay configuration
fn validate_relay_config(config: &super::RelayConfig) -> Result<()> {
    parse_url_with_scheme(&config.url, &["ws", "wss"], "Relay URL")?;

    if config.capacity == 0 {
        return Err(AttendanceError::Config(
            "Notification capacity must be greater than 0".to_string()
        ));
    }

    if config.initial_backoff_ms == 0 {
        return Err(AttendanceError::Config(
            "Initial reconnect backoff must be greater than 0".to_string()
        ));
    }

    if config.initial_backoff_ms > config.max_backoff_ms {
        return Err(AttendanceError::Config(
            "Initial reconnect backoff cannot be greater than max backoff".to_string()
        ));
    }

    Ok(())
}

/// Validate scanner configuration
fn validate_scanner_config(config: &super::ScannerConfig) -> Result<()> {
    if config.location_timeout_seconds == 0 {
        return Err(AttendanceError::Config(
            "Location timeout must be greater than 0".to_string()
        ));
    }

    if config.platform_fallback.trim().is_empty() {
        return Err(AttendanceError::Config(
            "Platform location fallback is required".to_string()
        ));
    }

    Ok(())
}

/// Validate session issuing configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.allowed_durations.is_empty() {
        return Err(AttendanceError::Config(
            "At least one session duration must be allowed".to_string()
        ));
    }

    for minutes in &config.allowed_durations {
        SessionDuration::from_minutes(*minutes).map_err(|_| {
            AttendanceError::Config(format!(
                "Unsupported session duration: {} minutes. Valid durations: {:?}",
                minutes,
                SessionDuration::ALL.iter().map(|d| d.minutes()).collect::<Vec<_>>()
            ))
        })?;
    }

    if !config.allowed_durations.contains(&config.default_duration) {
        return Err(AttendanceError::Config(
            "Default session duration must be in allowed durations list".to_string()
        ));
    }

    Ok(())
}

/// Validate credential storage configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.credentials_path.trim().is_empty() {
        return Err(AttendanceError::Config(
            "Credentials path is required".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(AttendanceError::Config(
            "Default language is required".to_string()
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(AttendanceError::Config(
            "At least one supported language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(AttendanceError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(AttendanceError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(AttendanceError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_wrong_relay_scheme() {
        let mut settings = Settings::default();
        settings.relay.url = "http://localhost:8080/ws".to_string();
        assert_matches!(validate_settings(&settings), Err(AttendanceError::Config(_)));
    }

    #[test]
    fn test_rejects_inverted_backoff() {
        let mut settings = Settings::default();
        settings.relay.initial_backoff_ms = 60_000;
        settings.relay.max_backoff_ms = 1_000;
        assert_matches!(validate_settings(&settings), Err(AttendanceError::Config(_)));
    }

    #[test]
    fn test_rejects_unsupported_duration() {
        let mut settings = Settings::default();
        settings.session.allowed_durations = vec![15, 20];
        assert_matches!(validate_settings(&settings), Err(AttendanceError::Config(msg)) if msg.contains("20"));
    }

    #[test]
    fn test_rejects_default_duration_outside_allowed() {
        let mut settings = Settings::default();
        settings.session.allowed_durations = vec![15, 60];
        settings.session.default_duration = 30;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unsupported_default_language() {
        let mut settings = Settings::default();
        settings.i18n.default_language = "ru".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
