//! Notification model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Priority attached to a pushed notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    #[serde(other)]
    Low,
}

/// Event pushed by the backend over the notification socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
