pub mod listener;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::PaywatchError;
use crate::models::{
    ActivityUpdate, BillingEvent, ProfileSubscription, SubscriptionRecord, UserProfile,
};

pub use listener::{
    ActivityListener, ChangeKind, DocChange, EventListener, ListenerId, ProfileListener,
    SnapshotListener, SubscriptionListener,
};
pub use memory::MemoryStore;

/// Store Result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for document-store operations
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Batch delete incomplete: {failed} of {attempted} deletes failed")]
    BatchIncomplete { attempted: usize, failed: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidData(_) => "invalid_data",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::BatchIncomplete { .. } => "batch_incomplete",
            StoreError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for PaywatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => PaywatchError::NotFound(msg),
            StoreError::InvalidData(msg) => PaywatchError::Validation(msg),
            StoreError::Unavailable(msg) => PaywatchError::ServiceUnavailable(msg),
            _ => PaywatchError::Store(err.to_string()),
        }
    }
}

/// Outcome of a best-effort feed clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedClearOutcome {
    pub activity_deleted: usize,
    pub events_deleted: usize,
}

impl FeedClearOutcome {
    pub fn total(&self) -> usize {
        self.activity_deleted + self.events_deleted
    }
}

/// Document store owning all durable state: profile projections,
/// subscription records, and the two per-user feeds. Every mutation is
/// an independent best-effort operation; change notifications are
/// pushed to the matching snapshot listeners after the write commits.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the store instance as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Health check with connection validation
    async fn health_check(&self) -> Result<bool>;

    /// Release the store; subsequent operations fail as unavailable
    async fn close(&self) -> Result<()>;

    // Profile projection
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    /// Merge-upsert keyed by user id
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<()>;
    /// Update only the denormalized subscription fields of a profile
    async fn merge_profile_subscription(
        &self,
        user_id: &str,
        subscription: &ProfileSubscription,
    ) -> Result<()>;

    // Subscription records. One record per user: `put_subscription`
    // upserts keyed on user id.
    async fn put_subscription(&self, record: &SubscriptionRecord) -> Result<()>;
    async fn get_active_subscription(&self, user_id: &str) -> Result<Option<SubscriptionRecord>>;
    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<SubscriptionRecord>>;
    async fn remove_subscription(&self, user_id: &str) -> Result<()>;

    // Append-only feeds
    async fn add_activity(&self, update: &ActivityUpdate) -> Result<()>;
    async fn add_event(&self, event: &BillingEvent) -> Result<()>;
    async fn recent_activity(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityUpdate>>;
    async fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<BillingEvent>>;
    /// Best-effort batch delete of one user's feed records. Partial
    /// failure is reported as a single aggregate error.
    async fn clear_user_feeds(&self, user_id: &str) -> Result<FeedClearOutcome>;

    // Snapshot listeners. Establishing a listener delivers the current
    // matching documents as `Added` changes (feeds deliver their newest
    // `limit` entries, oldest first).
    async fn watch_profile(&self, user_id: &str) -> Result<ProfileListener>;
    async fn watch_subscriptions(&self, user_id: &str) -> Result<SubscriptionListener>;
    async fn watch_activity(&self, user_id: &str, limit: usize) -> Result<ActivityListener>;
    async fn watch_events(&self, user_id: &str, limit: usize) -> Result<EventListener>;

    /// Number of live snapshot listeners across all feeds
    fn live_listeners(&self) -> usize;
}
