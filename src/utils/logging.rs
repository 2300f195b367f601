//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Presensi client.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{AttendanceError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer and must be kept alive for the
/// lifetime of the process when a log file is configured.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| AttendanceError::Config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let guard = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "presensi.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
                .try_init()
                .map_err(|e| AttendanceError::Config(format!("Logging already initialized: {}", e)))?;
            Some(guard)
        }
        None => {
            registry
                .try_init()
                .map_err(|e| AttendanceError::Config(format!("Logging already initialized: {}", e)))?;
            None
        }
    };

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a newly issued attendance session
pub fn log_session_issued(session_code: &str, subject: &str, duration_minutes: u32) {
    info!(
        session_code = session_code,
        subject = subject,
        duration_minutes = duration_minutes,
        "Attendance session issued"
    );
}

/// Log a scan attempt before any validation happens
pub fn log_scan_attempt(attempt_id: &str, payload_len: usize) {
    debug!(
        attempt_id = attempt_id,
        payload_len = payload_len,
        "QR payload decoded"
    );
}

/// Log the final outcome of a scan attempt
pub fn log_scan_outcome(attempt_id: &str, accepted: bool, details: Option<&str>) {
    if accepted {
        info!(attempt_id = attempt_id, details = details, "Attendance scan accepted");
    } else {
        warn!(attempt_id = attempt_id, details = details, "Attendance scan rejected");
    }
}

/// Log notification relay connection events
pub fn log_relay_event(event: &str, attempt: Option<u32>, details: Option<&str>) {
    info!(
        event = event,
        attempt = attempt,
        details = details,
        "Notification relay event"
    );
}

/// Log API errors with context
pub fn log_api_error(endpoint: &str, error: &str, context: Option<&str>) {
    error!(
        endpoint = endpoint,
        error = error,
        context = context,
        "API error occurred"
    );
}
