use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::models::{
    ActivityUpdate, BillingEvent, ProfileSubscription, SubscriptionRecord, UserProfile,
};
use crate::store::listener::{DocChange, ListenerRegistry};
use crate::store::{
    ActivityListener, DocumentStore, EventListener, FeedClearOutcome, ProfileListener, Result,
    StoreError, SubscriptionListener,
};

// In-memory store data (single mutex, matching the collection layout)
struct StoreData {
    profiles: HashMap<String, UserProfile>, // user_id -> profile projection
    subscriptions: HashMap<String, SubscriptionRecord>, // user_id -> record (single-active invariant)
    activity: Vec<ActivityUpdate>,
    events: Vec<BillingEvent>,
}

impl StoreData {
    fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            subscriptions: HashMap::new(),
            activity: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// In-memory document store with push-based snapshot listeners.
///
/// Plays the role of the external managed store: writes commit under a
/// single lock, then fan out to the matching listeners through the
/// registry. Also the storage used by tests and the demo binary.
pub struct MemoryStore {
    data: TokioMutex<StoreData>,
    registry: Arc<ListenerRegistry>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(StoreData::new()),
            registry: Arc::new(ListenerRegistry::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.closed.load(Ordering::SeqCst))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        Ok(data.profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        let existed = data
            .profiles
            .insert(profile.uid.clone(), profile.clone())
            .is_some();
        debug!(
            "Profile {} for user {}",
            if existed { "updated" } else { "created" },
            profile.uid
        );

        let change = if existed {
            DocChange::modified(profile.clone())
        } else {
            DocChange::added(profile.clone())
        };
        self.registry.notify_profile(&profile.uid, change).await;
        Ok(())
    }

    async fn merge_profile_subscription(
        &self,
        user_id: &str,
        subscription: &ProfileSubscription,
    ) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        let profile = data
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("profile for user {}", user_id)))?;
        profile.subscription = subscription.clone();
        profile.updated_at = Utc::now();
        let snapshot = profile.clone();
        debug!("Merged subscription fields into profile {}", user_id);

        self.registry
            .notify_profile(user_id, DocChange::modified(snapshot))
            .await;
        Ok(())
    }

    async fn put_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        let existed = data
            .subscriptions
            .insert(record.user_id.clone(), record.clone())
            .is_some();
        debug!(
            "Subscription record {} for user {}",
            if existed { "replaced" } else { "created" },
            record.user_id
        );

        let change = if existed {
            DocChange::modified(record.clone())
        } else {
            DocChange::added(record.clone())
        };
        self.registry
            .notify_subscription(&record.user_id, change)
            .await;
        Ok(())
    }

    async fn get_active_subscription(&self, user_id: &str) -> Result<Option<SubscriptionRecord>> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        Ok(data
            .subscriptions
            .get(user_id)
            .filter(|r| r.status.is_active())
            .cloned())
    }

    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<SubscriptionRecord>> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        Ok(data
            .subscriptions
            .get(user_id)
            .cloned()
            .into_iter()
            .collect())
    }

    async fn remove_subscription(&self, user_id: &str) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        let removed = data
            .subscriptions
            .remove(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("subscription for user {}", user_id)))?;

        self.registry
            .notify_subscription(user_id, DocChange::removed(removed))
            .await;
        Ok(())
    }

    async fn add_activity(&self, update: &ActivityUpdate) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        data.activity.push(update.clone());

        self.registry
            .notify_activity(&update.user_id, DocChange::added(update.clone()))
            .await;
        Ok(())
    }

    async fn add_event(&self, event: &BillingEvent) -> Result<()> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;
        data.events.push(event.clone());

        self.registry
            .notify_event(&event.user_id, DocChange::added(event.clone()))
            .await;
        Ok(())
    }

    async fn recent_activity(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityUpdate>> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        let mut matching: Vec<ActivityUpdate> = data
            .activity
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<BillingEvent>> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        let mut matching: Vec<BillingEvent> = data
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn clear_user_feeds(&self, user_id: &str) -> Result<FeedClearOutcome> {
        self.ensure_open()?;
        let mut data = self.data.lock().await;

        let activity_before = data.activity.len();
        data.activity.retain(|u| u.user_id != user_id);
        let activity_deleted = activity_before - data.activity.len();

        let events_before = data.events.len();
        data.events.retain(|e| e.user_id != user_id);
        let events_deleted = events_before - data.events.len();

        debug!(
            "Cleared feeds for user {}: {} activity, {} events",
            user_id, activity_deleted, events_deleted
        );
        Ok(FeedClearOutcome {
            activity_deleted,
            events_deleted,
        })
    }

    async fn watch_profile(&self, user_id: &str) -> Result<ProfileListener> {
        self.ensure_open()?;
        // Hold the data lock across registration so a concurrent write
        // is either in the initial snapshot or delivered later, never
        // both and never neither.
        let data = self.data.lock().await;
        let (listener, tx) = self.registry.register_profile(user_id);
        if let Some(profile) = data.profiles.get(user_id) {
            let _ = tx.send(DocChange::added(profile.clone())).await;
        }
        Ok(listener)
    }

    async fn watch_subscriptions(&self, user_id: &str) -> Result<SubscriptionListener> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        let (listener, tx) = self.registry.register_subscription(user_id);
        if let Some(record) = data.subscriptions.get(user_id) {
            let _ = tx.send(DocChange::added(record.clone())).await;
        }
        Ok(listener)
    }

    async fn watch_activity(&self, user_id: &str, limit: usize) -> Result<ActivityListener> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        let (listener, tx) = self.registry.register_activity(user_id);

        // Newest `limit` entries, delivered oldest first so prepending
        // renders newest-first.
        let mut initial: Vec<ActivityUpdate> = data
            .activity
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect();
        initial.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        initial.truncate(limit);
        for update in initial.into_iter().rev() {
            let _ = tx.send(DocChange::added(update)).await;
        }
        Ok(listener)
    }

    async fn watch_events(&self, user_id: &str, limit: usize) -> Result<EventListener> {
        self.ensure_open()?;
        let data = self.data.lock().await;
        let (listener, tx) = self.registry.register_event(user_id);

        let mut initial: Vec<BillingEvent> = data
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        initial.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        initial.truncate(limit);
        for event in initial.into_iter().rev() {
            let _ = tx.send(DocChange::added(event)).await;
        }
        Ok(listener)
    }

    fn live_listeners(&self) -> usize {
        self.registry.live_total()
    }
}
