//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the crate.

use std::sync::OnceLock;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a date for display (dd/MM/yyyy)
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y").to_string()
}

/// Format a date and time for display (dd/MM/yyyy HH:mm)
pub fn format_date_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M").to_string()
}

/// Format a time of day for display (HH:mm)
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Truncate text to a maximum number of characters, appending an ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_length).collect();
        format!("{}...", head)
    }
}

/// Render coordinates with six decimal places, as sent to the scan endpoint
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{:.6}, {:.6}", latitude, longitude)
}

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid month regex"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

/// Check a month filter in YYYY-MM form
pub fn is_valid_month(month: &str) -> bool {
    month_pattern().is_match(month)
}

/// Check a date filter in YYYY-MM-DD form that is also a real calendar date
pub fn is_valid_api_date(date: &str) -> bool {
    date_pattern().is_match(date) && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}
