use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{error, info};

use crate::config::constants::{
    EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, EVENT_SUBSCRIPTION_UPDATED,
    EVENT_TRIAL_WILL_END,
};
use crate::error::{PaywatchError, Result};
use crate::models::{ActivityUpdate, Severity};
use crate::services::{BillingService, RealtimeService, SessionService};
use crate::store::DocumentStore;
use crate::ui::toast::ToastManager;

/// Shell tying the services together: bootstrap, shutdown, and the
/// manual test triggers the dashboard exposes.
pub struct Shell {
    session: Arc<SessionService>,
    realtime: Arc<RealtimeService>,
    billing: Arc<BillingService>,
    store: Arc<dyn DocumentStore>,
    toasts: Arc<ToastManager>,
}

impl Shell {
    pub fn new(
        session: Arc<SessionService>,
        realtime: Arc<RealtimeService>,
        billing: Arc<BillingService>,
        store: Arc<dyn DocumentStore>,
        toasts: Arc<ToastManager>,
    ) -> Self {
        Self {
            session,
            realtime,
            billing,
            store,
            toasts,
        }
    }

    /// Bootstrap: run the initial (signed-out) identity fan-out.
    pub async fn start(&self) -> Result<()> {
        info!("Starting shell");
        self.session.start().await;
        Ok(())
    }

    /// Tear down the realtime listeners.
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping shell");
        self.realtime.detach().await;
        Ok(())
    }

    /// Write a random activity update for the current user.
    pub async fn test_activity_update(&self) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };

        let messages = [
            "Database connection established",
            "User preferences updated",
            "New feature unlocked",
            "System maintenance completed",
            "Performance optimization applied",
        ];
        let severities = [Severity::Info, Severity::Success, Severity::Warning];

        let (message, severity) = {
            let mut rng = rand::thread_rng();
            (
                *messages.choose(&mut rng).unwrap(),
                *severities.choose(&mut rng).unwrap(),
            )
        };

        match self
            .store
            .add_activity(&ActivityUpdate::new(&identity.uid, message, severity))
            .await
        {
            Ok(()) => {
                self.toasts.success("Real-time update sent!");
                Ok(())
            }
            Err(err) => {
                error!("Error creating test update: {}", err);
                self.toasts.error("Error creating test update");
                Err(err.into())
            }
        }
    }

    /// Synthesize a random webhook event for the current user.
    pub async fn test_webhook_event(&self) -> Result<()> {
        if self.session.current().await.is_none() {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        }

        let events = [
            (EVENT_PAYMENT_SUCCEEDED, 19_i64),
            (EVENT_SUBSCRIPTION_UPDATED, 0),
            (EVENT_PAYMENT_FAILED, 19),
            (EVENT_TRIAL_WILL_END, 0),
        ];
        let (event_type, amount) = {
            let mut rng = rand::thread_rng();
            *events.choose(&mut rng).unwrap()
        };

        let payload = if amount > 0 {
            serde_json::json!({ "amount": amount })
        } else {
            serde_json::json!({})
        };

        self.billing.simulate_webhook(event_type, payload).await?;
        self.toasts.success("Webhook event simulated!");
        Ok(())
    }

    /// Probe store connectivity.
    pub async fn test_store_connection(&self) -> Result<()> {
        match self.store.health_check().await {
            Ok(true) => {
                self.toasts.success("Store connection successful!");
                Ok(())
            }
            Ok(false) => {
                self.toasts.error("Store connection failed");
                Err(PaywatchError::store("health check reported unhealthy"))
            }
            Err(err) => {
                error!("Store test failed: {}", err);
                self.toasts.error("Store connection failed");
                Err(err.into())
            }
        }
    }

    /// Delete the current user's feed records and reset the panels.
    pub async fn clear_test_data(&self) -> Result<()> {
        self.realtime.clear_test_data().await
    }
}
