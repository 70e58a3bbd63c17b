use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{ActivityUpdate, BillingEvent, SubscriptionRecord, UserProfile};

/// Identifier of a registered snapshot listener
pub type ListenerId = u64;

/// Channel capacity per listener. Deliveries beyond an unread backlog
/// of this size are dropped with a warning.
const LISTENER_CHANNEL_CAPACITY: usize = 64;

/// Kind of change delivered by a snapshot listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One change delivered to a snapshot listener
#[derive(Debug, Clone)]
pub struct DocChange<T> {
    pub kind: ChangeKind,
    pub doc: T,
}

impl<T> DocChange<T> {
    pub fn added(doc: T) -> Self {
        Self {
            kind: ChangeKind::Added,
            doc,
        }
    }

    pub fn modified(doc: T) -> Self {
        Self {
            kind: ChangeKind::Modified,
            doc,
        }
    }

    pub fn removed(doc: T) -> Self {
        Self {
            kind: ChangeKind::Removed,
            doc,
        }
    }
}

/// Cancellable handle to one live snapshot subscription.
///
/// Dropping the handle (or calling [`cancel`](Self::cancel))
/// unregisters it from the store; no deliveries are made after that
/// point.
pub struct SnapshotListener<T> {
    id: ListenerId,
    rx: mpsc::Receiver<DocChange<T>>,
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> SnapshotListener<T> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Receive the next change; `None` once the subscription is gone.
    pub async fn recv(&mut self) -> Option<DocChange<T>> {
        self.rx.recv().await
    }

    /// Cancel the subscription explicitly.
    pub fn cancel(mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }

    /// Consume the handle as a stream of changes. The subscription
    /// stays registered until the stream is dropped.
    pub fn into_stream(self) -> impl futures::Stream<Item = DocChange<T>> {
        futures::stream::unfold(self, |mut listener| async move {
            listener.recv().await.map(|change| (change, listener))
        })
    }
}

impl<T> Drop for SnapshotListener<T> {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

pub type ProfileListener = SnapshotListener<UserProfile>;
pub type SubscriptionListener = SnapshotListener<SubscriptionRecord>;
pub type ActivityListener = SnapshotListener<ActivityUpdate>;
pub type EventListener = SnapshotListener<BillingEvent>;

/// One registered subscriber: the user-id filter plus its channel
struct Subscriber<T> {
    user_id: String,
    tx: mpsc::Sender<DocChange<T>>,
}

/// Registry of live snapshot listeners, one map per watched feed.
///
/// Writers call the `notify_*` methods after committing a change; the
/// registry fans the change out to every subscriber whose filter
/// matches the owning user.
pub struct ListenerRegistry {
    next_id: AtomicU64,
    profiles: Arc<DashMap<ListenerId, Subscriber<UserProfile>>>,
    subscriptions: Arc<DashMap<ListenerId, Subscriber<SubscriptionRecord>>>,
    activity: Arc<DashMap<ListenerId, Subscriber<ActivityUpdate>>>,
    events: Arc<DashMap<ListenerId, Subscriber<BillingEvent>>>,
}

macro_rules! feed_registration {
    ($register:ident, $notify:ident, $map:ident, $ty:ty) => {
        pub fn $register(
            &self,
            user_id: &str,
        ) -> (SnapshotListener<$ty>, mpsc::Sender<DocChange<$ty>>) {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let (tx, rx) = mpsc::channel(LISTENER_CHANNEL_CAPACITY);

            self.$map.insert(
                id,
                Subscriber {
                    user_id: user_id.to_string(),
                    tx: tx.clone(),
                },
            );
            debug!(
                "Registered {} listener {} for user {}",
                stringify!($map),
                id,
                user_id
            );

            let map = Arc::clone(&self.$map);
            let listener = SnapshotListener {
                id,
                rx,
                unregister: Some(Box::new(move || {
                    map.remove(&id);
                    debug!("Unregistered {} listener {}", stringify!($map), id);
                })),
            };

            (listener, tx)
        }

        pub async fn $notify(&self, user_id: &str, change: DocChange<$ty>) {
            let matching: Vec<(ListenerId, mpsc::Sender<DocChange<$ty>>)> = self
                .$map
                .iter()
                .filter(|entry| entry.value().user_id == user_id)
                .map(|entry| (*entry.key(), entry.value().tx.clone()))
                .collect();

            for (id, tx) in matching {
                if tx.send(change.clone()).await.is_err() {
                    warn!(
                        "Failed to deliver {} change to listener {}: receiver gone",
                        stringify!($map),
                        id
                    );
                }
            }
        }
    };
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            profiles: Arc::new(DashMap::new()),
            subscriptions: Arc::new(DashMap::new()),
            activity: Arc::new(DashMap::new()),
            events: Arc::new(DashMap::new()),
        }
    }

    feed_registration!(register_profile, notify_profile, profiles, UserProfile);
    feed_registration!(
        register_subscription,
        notify_subscription,
        subscriptions,
        SubscriptionRecord
    );
    feed_registration!(register_activity, notify_activity, activity, ActivityUpdate);
    feed_registration!(register_event, notify_event, events, BillingEvent);

    /// Total number of live listeners across all feeds
    pub fn live_total(&self) -> usize {
        self.profiles.len() + self.subscriptions.len() + self.activity.len() + self.events.len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::Severity;

    fn update_for(user: &str) -> ActivityUpdate {
        ActivityUpdate::new(user, "test", Severity::Info)
    }

    #[tokio::test]
    async fn delivers_only_to_matching_user() {
        let registry = Arc::new(ListenerRegistry::new());
        let (mut l1, _tx1) = registry.register_activity("u1");
        let (mut l2, _tx2) = registry.register_activity("u2");

        registry
            .notify_activity("u1", DocChange::added(update_for("u1")))
            .await;

        let change = l1.recv().await.unwrap();
        assert_eq!(change.doc.user_id, "u1");
        assert!(tokio::time::timeout(std::time::Duration::from_millis(20), l2.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn stream_adapter_delivers_and_unregisters_on_drop() {
        use futures::StreamExt;

        let registry = Arc::new(ListenerRegistry::new());
        let (listener, _tx) = registry.register_activity("u1");
        let mut stream = Box::pin(listener.into_stream());

        registry
            .notify_activity("u1", DocChange::added(update_for("u1")))
            .await;
        assert_eq!(stream.next().await.unwrap().doc.message, "test");
        assert_eq!(registry.live_total(), 1);

        drop(stream);
        assert_eq!(registry.live_total(), 0);
    }

    #[tokio::test]
    async fn drop_unregisters() {
        let registry = Arc::new(ListenerRegistry::new());
        let (listener, _tx) = registry.register_activity("u1");
        assert_eq!(registry.live_total(), 1);

        drop(listener);
        assert_eq!(registry.live_total(), 0);
    }

    #[tokio::test]
    async fn cancel_unregisters() {
        let registry = Arc::new(ListenerRegistry::new());
        let (listener, _tx) = registry.register_profile("u1");
        assert_eq!(registry.live_total(), 1);

        listener.cancel();
        assert_eq!(registry.live_total(), 0);

        // Notifying after cancel reaches nobody and must not panic.
        let profile = UserProfile::from_identity(
            &crate::models::Identity {
                uid: "u1".into(),
                email: "u1@example.com".into(),
                display_name: None,
                photo_url: None,
                email_verified: false,
                last_sign_in: Utc::now(),
            },
            Utc::now(),
        );
        registry
            .notify_profile("u1", DocChange::modified(profile))
            .await;
    }
}
