//! Scan submission models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Body posted to the scan endpoint.
///
/// `qr_data` is the raw decoded text, re-sent verbatim so the backend parses
/// it independently of the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSubmission {
    pub qr_data: String,
    pub student_id: String,
    pub location: String,
}

/// Backend confirmation of a recorded scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReceipt {
    pub message: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub scan_time: Option<DateTime<Utc>>,
}
