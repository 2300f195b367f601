//! Attendance session models

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::utils::errors::ApiError;

/// A time-boxed attendance window as the backend exposes it to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub session_code: String,
    pub subject: String,
    pub teacher: String,
    pub location: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AttendanceSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Seconds left before the session closes, zero once expired
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Length of an attendance session. Only these values are offered to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SessionDuration {
    Minutes15,
    Minutes30,
    Minutes45,
    Minutes60,
    Minutes90,
    Minutes120,
}

impl SessionDuration {
    pub const ALL: [SessionDuration; 6] = [
        SessionDuration::Minutes15,
        SessionDuration::Minutes30,
        SessionDuration::Minutes45,
        SessionDuration::Minutes60,
        SessionDuration::Minutes90,
        SessionDuration::Minutes120,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            SessionDuration::Minutes15 => 15,
            SessionDuration::Minutes30 => 30,
            SessionDuration::Minutes45 => 45,
            SessionDuration::Minutes60 => 60,
            SessionDuration::Minutes90 => 90,
            SessionDuration::Minutes120 => 120,
        }
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, ApiError> {
        Self::ALL
            .into_iter()
            .find(|d| d.minutes() == minutes)
            .ok_or_else(|| ApiError::Validation(format!(
                "Session duration must be one of 15, 30, 45, 60, 90 or 120 minutes, got {}",
                minutes
            )))
    }
}

impl Default for SessionDuration {
    fn default() -> Self {
        SessionDuration::Minutes30
    }
}

impl TryFrom<u32> for SessionDuration {
    type Error = ApiError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        SessionDuration::from_minutes(minutes)
    }
}

impl From<SessionDuration> for u32 {
    fn from(duration: SessionDuration) -> Self {
        duration.minutes()
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

/// Body of the session creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub subject: String,
    pub teacher: String,
    pub location: String,
    pub duration: SessionDuration,
}

/// Backend response to a session creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_code: String,
    /// Server-rendered PNG of the token, base64 text; kept opaque
    #[serde(default)]
    pub qr_code: String,
    pub expires_at: DateTime<Utc>,
    pub subject: String,
    pub teacher: String,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionList {
    pub sessions: Vec<AttendanceSession>,
}

/// One attendance row of a session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAttendance {
    #[serde(default)]
    pub id: Option<u64>,
    pub session_code: String,
    pub student_id: String,
    pub scan_time: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub grade: String,
}

/// Who attended a given session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session: AttendanceSession,
    pub attendances: Vec<SessionAttendance>,
    pub total_count: u64,
}
