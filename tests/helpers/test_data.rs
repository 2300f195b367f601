//! Test data helpers for creating tokens, notifications and credentials

use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::json;
use Presensi::config::Settings;
use Presensi::i18n::I18n;
use Presensi::models::UserType;
use Presensi::state::{Credentials, RequestContext};

/// QR token text as the issuer encodes it
pub fn token_json(session_code: &str, subject: &str, expires_at: i64) -> String {
    json!({
        "session_code": session_code,
        "subject": subject,
        "teacher": "Pak Agus",
        "location": "Room 101",
        "expires_at": expires_at
    })
    .to_string()
}

/// Token valid for another ten minutes from `now`
pub fn fresh_token(now: DateTime<Utc>) -> String {
    token_json("S1", "Math", now.timestamp() + 600)
}

/// One notification as the backend pushes it over the socket
pub fn notification_json(id: i64, priority: &str) -> String {
    json!({
        "id": id,
        "type": "attendance",
        "title": format!("Notification {}", id),
        "message": format!("Siswa {} hadir", id),
        "user_id": 1,
        "user_type": "admin",
        "priority": priority,
        "read": false,
        "created_at": "2025-03-07T08:05:00Z"
    })
    .to_string()
}

pub fn student_credentials() -> Credentials {
    Credentials {
        token: "student-token".to_string(),
        user_type: UserType::Student,
        user_id: 7,
        student_id: Some("2024001".to_string()),
        name: "Budi Santoso".to_string(),
    }
}

pub fn admin_credentials() -> Credentials {
    Credentials {
        token: "admin-token".to_string(),
        user_type: UserType::Admin,
        user_id: 1,
        student_id: None,
        name: "Administrator".to_string(),
    }
}

pub fn student_context() -> RequestContext {
    RequestContext::from_credentials(student_credentials())
}

pub fn admin_context() -> RequestContext {
    RequestContext::from_credentials(admin_credentials())
}

/// Student JSON as returned by `/profile` and the admin student endpoints
pub fn student_json(id: u64, student_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "student_id": student_id,
        "name": "Budi Santoso",
        "email": "budi@example.com",
        "class": "XI-A",
        "grade": "11",
        "phone_number": "",
        "address": "",
        "is_active": true,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

pub fn bundled_i18n(settings: &Settings) -> Arc<I18n> {
    Arc::new(I18n::bundled(&settings.i18n).expect("bundled translations"))
}
