use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated end-user identity.
///
/// Held only in memory for the lifetime of the session; the durable
/// counterpart is the [`UserProfile`](crate::models::UserProfile)
/// projection in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user id
    pub uid: String,
    /// Email address
    pub email: String,
    /// Display name, if the provider supplied one
    pub display_name: Option<String>,
    /// Profile photo reference
    pub photo_url: Option<String>,
    /// Whether the provider verified the email address
    pub email_verified: bool,
    /// Last sign-in instant
    pub last_sign_in: DateTime<Utc>,
}

impl Identity {
    /// Label shown in chrome: display name when present, email otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
