use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the per-user activity feed. Append-only, rendered
/// newest-first with only the latest entries kept on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    /// Record id
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Human-readable message
    pub message: String,
    /// Severity tag controlling panel styling
    pub severity: Severity,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}

impl ActivityUpdate {
    pub fn new(user_id: &str, message: &str, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// Severity tag for activity entries and toasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}
