//! Presensi attendance client
//!
//! Client library for the school attendance backend: QR attendance sessions
//! (issue, decode, submit), the live notification relay and the student and
//! admin APIs, with a command-line front end in `main.rs`.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod state;
pub mod i18n;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{AttendanceError, ApiError, TokenError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use state::{NotificationFeed, RequestContext, ScanOutcome, ScanState};
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
