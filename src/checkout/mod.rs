use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PaywatchError, Result};
use crate::models::Plan;

/// Request forwarded to the checkout backend when opening a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub user_id: String,
    pub user_email: String,
    pub plan_name: String,
}

impl CheckoutRequest {
    pub fn for_plan(plan: &Plan, user_id: &str, user_email: &str) -> Self {
        Self {
            price_id: plan.price_id.clone(),
            user_id: user_id.to_string(),
            user_email: user_email.to_string(),
            plan_name: plan.name.clone(),
        }
    }
}

/// Opened checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
}

/// Hosted-checkout client seam. The real platform would create the
/// session server-side and redirect the browser; the demo only needs
/// the session handshake shape.
#[async_trait]
pub trait CheckoutClient: Send + Sync {
    /// Create a checkout session for the given purchase
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;

    /// Hand control to the hosted checkout page
    async fn redirect_to_checkout(&self, session: &CheckoutSession) -> Result<()>;
}

/// Stub standing in for the hosted checkout: synthesizes a session id
/// after a simulated round-trip.
pub struct HostedCheckoutStub {
    latency: Duration,
}

impl HostedCheckoutStub {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl CheckoutClient for HostedCheckoutStub {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        debug!(
            "Creating checkout session: plan={}, user={}",
            request.plan_name, request.user_id
        );
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if request.price_id.is_empty() {
            return Err(PaywatchError::billing("No price id on checkout request"));
        }

        Ok(CheckoutSession {
            session_id: format!("cs_test_{}", nanoid::nanoid!(9)),
        })
    }

    async fn redirect_to_checkout(&self, session: &CheckoutSession) -> Result<()> {
        // The hosted page does not exist in the demo; the session id is
        // logged where the redirect would happen.
        info!("Redirect to hosted checkout: {}", session.session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_creates_test_session_ids() {
        let stub = HostedCheckoutStub::new(Duration::ZERO);
        let request = CheckoutRequest {
            price_id: "price_basic_monthly_id".to_string(),
            user_id: "u1".to_string(),
            user_email: "u1@example.com".to_string(),
            plan_name: "Basic".to_string(),
        };
        let session = stub.create_session(&request).await.unwrap();
        assert!(session.session_id.starts_with("cs_test_"));
        stub.redirect_to_checkout(&session).await.unwrap();
    }
}
