use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-synthesized billing event standing in for a real payment
/// platform webhook, used to exercise the notification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEvent {
    /// Record id
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Webhook-style event type, e.g. `customer.subscription.created`
    pub event_type: String,
    /// Human-readable description
    pub description: String,
    /// Arbitrary event payload
    pub payload: serde_json::Value,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}

impl BillingEvent {
    pub fn new(
        user_id: &str,
        event_type: &str,
        description: &str,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            description: description.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }
}
