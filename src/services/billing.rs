use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::checkout::{CheckoutClient, CheckoutRequest};
use crate::config::constants::{
    EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, EVENT_SUBSCRIPTION_CREATED,
    EVENT_SUBSCRIPTION_DELETED, EVENT_SUBSCRIPTION_UPDATED,
};
use crate::config::settings::BillingConfig;
use crate::error::{PaywatchError, Result};
use crate::models::{
    BillingEvent, Identity, Plan, PlanCatalog, ProfileSubscription, SubscriptionRecord,
    SubscriptionStatus,
};
use crate::services::session::{IdentityObserver, IdentityScope, SessionService};
use crate::store::DocumentStore;
use crate::ui::render::management_view;
use crate::ui::surface::UiSurface;
use crate::ui::toast::ToastManager;
use crate::ui::LoadingGate;

/// Owns the locally faked subscription lifecycle: purchases, plan
/// changes, cancellations, and the synthesized webhook-style events the
/// realtime pipeline observes.
pub struct BillingService {
    store: Arc<dyn DocumentStore>,
    checkout: Arc<dyn CheckoutClient>,
    session: Arc<SessionService>,
    surface: Arc<dyn UiSurface>,
    toasts: Arc<ToastManager>,
    loading: Arc<LoadingGate>,
    catalog: PlanCatalog,
    config: BillingConfig,
}

impl BillingService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        checkout: Arc<dyn CheckoutClient>,
        session: Arc<SessionService>,
        surface: Arc<dyn UiSurface>,
        toasts: Arc<ToastManager>,
        loading: Arc<LoadingGate>,
        config: BillingConfig,
    ) -> Self {
        let catalog = PlanCatalog::standard(&config.currency);
        Self {
            store,
            checkout,
            session,
            surface,
            toasts,
            loading,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Start a subscription to the given plan.
    ///
    /// Requires a signed-in identity; otherwise the login prompt is
    /// raised and nothing is written. In order: checkout session,
    /// subscription record upsert, profile projection merge,
    /// `customer.subscription.created` event, success toast. Every
    /// write is guarded by the identity scope taken at entry.
    pub async fn start_subscription(&self, plan_id: &str) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.surface.prompt_login();
            self.toasts.warning("Please log in to subscribe");
            return Err(PaywatchError::auth("not signed in"));
        };

        let Some(plan) = self.catalog.get(plan_id).cloned() else {
            self.toasts.error("Unknown subscription plan");
            return Err(PaywatchError::validation(format!(
                "unknown plan id: {}",
                plan_id
            )));
        };

        let scope = self.session.scope();
        let _guard = self.loading.acquire();

        let request = CheckoutRequest::for_plan(&plan, &identity.uid, &identity.email);
        let checkout_session = match self.checkout.create_session(&request).await {
            Ok(session) => session,
            Err(err) => {
                error!("Subscription error: {}", err);
                self.toasts
                    .error("Error creating subscription. Please try again.");
                return Err(err);
            }
        };
        if !scope.is_current() {
            debug!("Identity changed during checkout; abandoning purchase");
            return Ok(());
        }

        match self
            .record_purchase(&identity, &plan, &scope)
            .await
        {
            Ok(true) => {
                // Where a real integration would hand the browser over
                // to the hosted page.
                if let Err(err) = self.checkout.redirect_to_checkout(&checkout_session).await {
                    error!("Checkout redirect error: {}", err);
                    self.toasts.error("Error redirecting to checkout");
                }
                self.toasts
                    .success(&format!("Successfully subscribed to {} plan!", plan.name));
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                error!("Subscription error: {}", err);
                self.toasts
                    .error("Error creating subscription. Please try again.");
                Err(err)
            }
        }
    }

    /// Commit the purchase writes. Returns `Ok(false)` when the scope
    /// went stale mid-flight and the remaining writes were skipped.
    async fn record_purchase(
        &self,
        identity: &Identity,
        plan: &Plan,
        scope: &IdentityScope,
    ) -> Result<bool> {
        let now = Utc::now();
        let record = SubscriptionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: identity.uid.clone(),
            plan_name: Some(plan.name.clone()),
            price_id: plan.price_id.clone(),
            status: SubscriptionStatus::Active,
            amount: plan.amount,
            currency: plan.currency.clone(),
            created_at: now,
            updated_at: now,
            next_billing_date: Some(now + chrono::Duration::days(self.config.billing_cycle_days)),
            cancelled_at: None,
        };

        self.store.put_subscription(&record).await?;
        if !scope.is_current() {
            debug!("Identity changed after record write; skipping projection");
            return Ok(false);
        }

        self.store
            .merge_profile_subscription(&identity.uid, &ProfileSubscription::from_record(&record))
            .await?;
        if !scope.is_current() {
            debug!("Identity changed after projection write; skipping event");
            return Ok(false);
        }

        self.emit_event(
            &identity.uid,
            EVENT_SUBSCRIPTION_CREATED,
            json!({
                "subscription": {
                    "plan_name": plan.name,
                    "price_id": plan.price_id,
                    "status": "active",
                    "amount": plan.amount,
                    "currency": plan.currency,
                },
                "customer": {
                    "email": identity.email,
                    "id": identity.uid,
                },
            }),
        )
        .await?;
        Ok(true)
    }

    /// Open the stand-in subscription-management surface.
    pub async fn open_management_surface(&self) -> Result<()> {
        if self.session.current().await.is_none() {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        }

        let _guard = self.loading.acquire();
        self.surface.show_management(&management_view());
        Ok(())
    }

    /// Simulate a plan change to Pro.
    ///
    /// Intentionally mutates only the profile projection, standing in
    /// for a real payment webhook; the subscription record keeps its
    /// previous plan.
    pub async fn simulate_plan_change(&self) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };
        let scope = self.session.scope();

        let pro = self
            .catalog
            .get("plan_pro")
            .cloned()
            .ok_or_else(|| PaywatchError::billing("plan_pro missing from catalog"))?;

        let previous_plan = self
            .store
            .get_profile(&identity.uid)
            .await
            .ok()
            .flatten()
            .map(|p| p.subscription);
        if !scope.is_current() {
            return Ok(());
        }

        let projection = ProfileSubscription {
            status: SubscriptionStatus::Active,
            plan_name: Some(pro.name.clone()),
            amount: Some(pro.amount),
            next_billing_date: previous_plan.as_ref().and_then(|s| s.next_billing_date),
        };

        match self.apply_projection_change(
            &identity,
            &scope,
            projection,
            EVENT_SUBSCRIPTION_UPDATED,
            json!({
                "subscription": {
                    "plan_name": pro.name,
                    "status": "active",
                    "amount": pro.amount,
                },
                "previous_attributes": {
                    "plan_name": previous_plan.and_then(|s| s.plan_name),
                },
            }),
        )
        .await
        {
            Ok(()) => {
                self.toasts.success("Subscription updated to Pro plan!");
                Ok(())
            }
            Err(err) => {
                error!("Error simulating subscription change: {}", err);
                self.toasts.error("Error updating subscription");
                Err(err)
            }
        }
    }

    /// Simulate a cancellation.
    ///
    /// Like the plan change this mutates only the projection: the
    /// status flips to cancelled and the plan is cleared, while the
    /// earlier subscription record is left in place.
    pub async fn simulate_cancellation(&self) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };
        let scope = self.session.scope();

        let previous = self
            .store
            .get_profile(&identity.uid)
            .await
            .ok()
            .flatten()
            .map(|p| p.subscription);
        if !scope.is_current() {
            return Ok(());
        }

        let projection = ProfileSubscription {
            status: SubscriptionStatus::Cancelled,
            plan_name: None,
            amount: previous.as_ref().and_then(|s| s.amount),
            next_billing_date: None,
        };

        match self.apply_projection_change(
            &identity,
            &scope,
            projection,
            EVENT_SUBSCRIPTION_DELETED,
            json!({
                "subscription": {
                    "plan_name": serde_json::Value::Null,
                    "status": "cancelled",
                    "cancelled_at": Utc::now().to_rfc3339(),
                },
            }),
        )
        .await
        {
            Ok(()) => {
                self.toasts.warning("Subscription cancelled successfully");
                Ok(())
            }
            Err(err) => {
                error!("Error simulating subscription cancellation: {}", err);
                self.toasts.error("Error cancelling subscription");
                Err(err)
            }
        }
    }

    async fn apply_projection_change(
        &self,
        identity: &Identity,
        scope: &IdentityScope,
        projection: ProfileSubscription,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.store
            .merge_profile_subscription(&identity.uid, &projection)
            .await?;
        if !scope.is_current() {
            debug!("Identity changed after projection write; skipping event");
            return Ok(());
        }
        self.emit_event(&identity.uid, event_type, payload).await?;
        Ok(())
    }

    /// Synthesize one webhook-style event record.
    pub async fn simulate_webhook(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };
        self.emit_event(&identity.uid, event_type, payload).await
    }

    /// Replay a fixed sequence of webhook events with a delay between
    /// each, as an operator convenience.
    pub async fn run_webhook_sequence(&self) -> Result<()> {
        let Some(identity) = self.session.current().await else {
            self.toasts.warning("Please log in first");
            return Err(PaywatchError::auth("not signed in"));
        };

        let events = [
            (EVENT_PAYMENT_SUCCEEDED, json!({ "amount": 19 })),
            (
                EVENT_SUBSCRIPTION_UPDATED,
                json!({ "subscription": { "plan_name": "Pro" } }),
            ),
            (EVENT_PAYMENT_FAILED, json!({ "amount": 19 })),
        ];
        let delay = Duration::from_millis(self.config.checkout_latency_ms);

        for (event_type, payload) in events {
            self.emit_event(&identity.uid, event_type, payload).await?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.toasts.success("Webhook events simulated!");
        Ok(())
    }

    async fn emit_event(
        &self,
        user_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let description = describe_event(event_type, &payload);
        let event = BillingEvent::new(user_id, event_type, &description, payload);
        self.store.add_event(&event).await?;
        info!("Webhook event simulated: {}", event_type);
        Ok(())
    }
}

/// Fixed event-type-to-description table; unknown types fall back to a
/// generic line.
fn describe_event(event_type: &str, payload: &serde_json::Value) -> String {
    let plan_name = payload["subscription"]["plan_name"]
        .as_str()
        .unwrap_or("Unknown");
    let amount = payload["amount"].as_i64().unwrap_or(0);

    match event_type {
        EVENT_SUBSCRIPTION_CREATED => {
            format!("New subscription created for {} plan", plan_name)
        }
        EVENT_SUBSCRIPTION_UPDATED => format!("Subscription updated to {} plan", plan_name),
        EVENT_SUBSCRIPTION_DELETED => "Subscription cancelled".to_string(),
        EVENT_PAYMENT_SUCCEEDED => format!("Payment of ${} succeeded", amount),
        EVENT_PAYMENT_FAILED => format!("Payment of ${} failed", amount),
        _ => format!("Webhook event: {}", event_type),
    }
}

#[async_trait]
impl IdentityObserver for BillingService {
    /// Load the current plan when an identity signs in (visibility
    /// only; the realtime pipeline drives the panels).
    async fn identity_changed(&self, identity: Option<Identity>) {
        if let Some(identity) = identity {
            match self.store.get_active_subscription(&identity.uid).await {
                Ok(Some(record)) => debug!(
                    "Loaded subscription for {}: {} ({})",
                    identity.uid,
                    record.plan_name.as_deref().unwrap_or("Unknown"),
                    record.status
                ),
                Ok(None) => debug!("No active subscription for {}", identity.uid),
                Err(err) => error!("Error loading subscription status: {}", err),
            }
        }
    }
}
