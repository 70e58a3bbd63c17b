use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::constants::{ACTIVITY_PLACEHOLDER, EVENTS_PLACEHOLDER, SUBSCRIPTION_PLACEHOLDER};
use crate::config::settings::UiConfig;
use crate::error::{PaywatchError, Result};
use crate::models::{ActivityUpdate, Identity, Severity, SubscriptionStatus};
use crate::services::session::IdentityObserver;
use crate::store::{ChangeKind, DocumentStore};
use crate::ui::render::{
    feed_entry_from_activity, feed_entry_from_event, render_chrome,
    render_subscription_from_profile, render_subscription_from_record, PanelKind, PanelView,
};
use crate::ui::state::FeedPanel;
use crate::ui::surface::UiSurface;
use crate::ui::toast::ToastManager;

/// Live attachment to one identity: the four listener tasks plus the
/// panel models they render into.
struct Attachment {
    user_id: String,
    tasks: Vec<JoinHandle<()>>,
    activity_panel: Arc<TokioMutex<FeedPanel>>,
    events_panel: Arc<TokioMutex<FeedPanel>>,
}

/// Owns the live subscriptions to the per-user store records and
/// translates each push notification into a panel update.
///
/// On every identity change the previous listeners are torn down and
/// awaited before new ones are established, so at most one listener
/// per feed is live at any time and nothing from a previous identity
/// renders into the next one's panels.
pub struct RealtimeService {
    store: Arc<dyn DocumentStore>,
    surface: Arc<dyn UiSurface>,
    toasts: Arc<ToastManager>,
    config: UiConfig,
    attachment: TokioMutex<Option<Attachment>>,
}

impl RealtimeService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        surface: Arc<dyn UiSurface>,
        toasts: Arc<ToastManager>,
        config: UiConfig,
    ) -> Self {
        Self {
            store,
            surface,
            toasts,
            config,
            attachment: TokioMutex::new(None),
        }
    }

    /// Establish the four listeners for the given identity, tearing
    /// down any previous attachment first.
    pub async fn attach(&self, identity: &Identity) -> Result<()> {
        self.detach().await;

        let limit = self.config.feed_panel_limit;
        let activity_panel = Arc::new(TokioMutex::new(FeedPanel::new(limit, ACTIVITY_PLACEHOLDER)));
        let events_panel = Arc::new(TokioMutex::new(FeedPanel::new(limit, EVENTS_PLACEHOLDER)));

        // Panels start in their empty state; the initial snapshots
        // arrive through the listeners like any other change.
        self.surface
            .apply_panel(PanelKind::Activity, activity_panel.lock().await.render());
        self.surface
            .apply_panel(PanelKind::Events, events_panel.lock().await.render());
        self.surface.apply_panel(
            PanelKind::Subscription,
            PanelView::Placeholder(SUBSCRIPTION_PLACEHOLDER.to_string()),
        );

        let uid = identity.uid.clone();
        let mut profile_listener = match self.store.watch_profile(&uid).await {
            Ok(listener) => listener,
            Err(err) => return self.report_setup_error(err.into()),
        };
        let mut subscription_listener = match self.store.watch_subscriptions(&uid).await {
            Ok(listener) => listener,
            Err(err) => return self.report_setup_error(err.into()),
        };
        let mut activity_listener = match self.store.watch_activity(&uid, limit).await {
            Ok(listener) => listener,
            Err(err) => return self.report_setup_error(err.into()),
        };
        let mut event_listener = match self.store.watch_events(&uid, limit).await {
            Ok(listener) => listener,
            Err(err) => return self.report_setup_error(err.into()),
        };

        let mut tasks = Vec::with_capacity(4);

        // Profile projection: drives the subscription panel and the
        // manage control, and notes the sync in the activity panel.
        {
            let surface = Arc::clone(&self.surface);
            let panel = Arc::clone(&activity_panel);
            let identity = identity.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(change) = profile_listener.recv().await {
                    let profile = change.doc;
                    debug!("Profile update for {}", profile.uid);
                    surface.apply_panel(
                        PanelKind::Subscription,
                        render_subscription_from_profile(&profile.subscription),
                    );
                    surface.set_chrome(render_chrome(
                        Some(&identity),
                        profile.subscription.status != SubscriptionStatus::None,
                    ));

                    let note =
                        ActivityUpdate::new(&profile.uid, "User data synchronized", Severity::Info);
                    let mut panel = panel.lock().await;
                    panel.prepend(feed_entry_from_activity(&note));
                    surface.apply_panel(PanelKind::Activity, panel.render());
                }
            }));
        }

        // Subscription records: derived activity entry plus a direct
        // re-render of the subscription panel from the record.
        {
            let surface = Arc::clone(&self.surface);
            let panel = Arc::clone(&activity_panel);
            let uid = uid.clone();
            tasks.push(tokio::spawn(async move {
                while let Some(change) = subscription_listener.recv().await {
                    let record = change.doc;
                    let (message, severity) = match change.kind {
                        ChangeKind::Added => (
                            format!(
                                "New subscription created: {}",
                                record.plan_name.as_deref().unwrap_or("Unknown")
                            ),
                            Severity::Success,
                        ),
                        ChangeKind::Modified => (
                            format!("Subscription updated: {}", record.status),
                            Severity::Info,
                        ),
                        ChangeKind::Removed => {
                            ("Subscription cancelled".to_string(), Severity::Warning)
                        }
                    };

                    let note = ActivityUpdate::new(&uid, &message, severity);
                    {
                        let mut panel = panel.lock().await;
                        panel.prepend(feed_entry_from_activity(&note));
                        surface.apply_panel(PanelKind::Activity, panel.render());
                    }
                    surface.apply_panel(
                        PanelKind::Subscription,
                        render_subscription_from_record(&record),
                    );
                }
            }));
        }

        // Activity feed
        {
            let surface = Arc::clone(&self.surface);
            let panel = Arc::clone(&activity_panel);
            tasks.push(tokio::spawn(async move {
                while let Some(change) = activity_listener.recv().await {
                    if change.kind != ChangeKind::Added {
                        continue;
                    }
                    let mut panel = panel.lock().await;
                    panel.prepend(feed_entry_from_activity(&change.doc));
                    surface.apply_panel(PanelKind::Activity, panel.render());
                }
            }));
        }

        // Event feed
        {
            let surface = Arc::clone(&self.surface);
            let panel = Arc::clone(&events_panel);
            tasks.push(tokio::spawn(async move {
                while let Some(change) = event_listener.recv().await {
                    if change.kind != ChangeKind::Added {
                        continue;
                    }
                    let mut panel = panel.lock().await;
                    panel.prepend(feed_entry_from_event(&change.doc));
                    surface.apply_panel(PanelKind::Events, panel.render());
                }
            }));
        }

        *self.attachment.lock().await = Some(Attachment {
            user_id: uid.clone(),
            tasks,
            activity_panel,
            events_panel,
        });
        info!("Realtime listeners established for {}", uid);
        Ok(())
    }

    /// Tear down the current attachment, if any. Listener tasks are
    /// aborted and awaited so their subscriptions are unregistered
    /// before this returns.
    pub async fn detach(&self) {
        let attachment = self.attachment.lock().await.take();
        if let Some(attachment) = attachment {
            for task in attachment.tasks {
                task.abort();
                let _ = task.await;
            }
            debug!("Realtime listeners torn down for {}", attachment.user_id);
        }
    }

    /// Delete the current user's activity and event records and reset
    /// both feed panels. Best-effort: partial failure is reported as a
    /// single aggregate error and the panels are left untouched.
    pub async fn clear_test_data(&self) -> Result<()> {
        let attachment = self.attachment.lock().await;
        let Some(attachment) = attachment.as_ref() else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };

        match self.store.clear_user_feeds(&attachment.user_id).await {
            Ok(outcome) => {
                debug!(
                    "Cleared {} records for {}",
                    outcome.total(),
                    attachment.user_id
                );
                {
                    let mut panel = attachment.activity_panel.lock().await;
                    panel.clear();
                    self.surface.apply_panel(PanelKind::Activity, panel.render());
                }
                {
                    let mut panel = attachment.events_panel.lock().await;
                    panel.clear();
                    self.surface.apply_panel(PanelKind::Events, panel.render());
                }
                self.toasts.success("Test data cleared!");
                Ok(())
            }
            Err(err) => {
                error!("Error clearing test data: {}", err);
                self.toasts.error("Error clearing test data");
                Err(err.into())
            }
        }
    }

    /// Number of entries currently visible in the activity panel
    pub async fn activity_panel_len(&self) -> usize {
        match self.attachment.lock().await.as_ref() {
            Some(attachment) => attachment.activity_panel.lock().await.len(),
            None => 0,
        }
    }

    fn report_setup_error(&self, err: PaywatchError) -> Result<()> {
        error!("Error establishing realtime listeners: {}", err);
        self.toasts.error("Error establishing live updates");
        Err(err)
    }

    /// Reset all dashboard panels to their signed-out placeholders.
    fn reset_panels(&self) {
        self.surface.apply_panel(
            PanelKind::Subscription,
            PanelView::Placeholder(SUBSCRIPTION_PLACEHOLDER.to_string()),
        );
        self.surface.apply_panel(
            PanelKind::Activity,
            PanelView::Placeholder(ACTIVITY_PLACEHOLDER.to_string()),
        );
        self.surface.apply_panel(
            PanelKind::Events,
            PanelView::Placeholder(EVENTS_PLACEHOLDER.to_string()),
        );
    }
}

#[async_trait]
impl IdentityObserver for RealtimeService {
    async fn identity_changed(&self, identity: Option<Identity>) {
        match identity {
            Some(identity) => {
                if let Err(err) = self.attach(&identity).await {
                    error!("Realtime attach failed for {}: {}", identity.uid, err);
                }
            }
            None => {
                self.detach().await;
                self.reset_panels();
            }
        }
    }
}
