use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Billing-plan state for one identity, as distinct from its
/// denormalized projection onto the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Record id
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Plan name, cleared on cancellation
    pub plan_name: Option<String>,
    /// Hosted-checkout price id the record was created from
    pub price_id: String,
    /// Lifecycle status
    pub status: SubscriptionStatus,
    /// Plan amount, currency-minor-agnostic
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last update instant
    pub updated_at: DateTime<Utc>,
    /// Next billing instant, when the record is active
    pub next_billing_date: Option<DateTime<Utc>>,
    /// Cancellation instant, when cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    None,
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionStatus::None => "none",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SubscriptionStatus::None),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            SubscriptionStatus::None,
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<SubscriptionStatus>(), Ok(status));
        }
        assert!("expired".parse::<SubscriptionStatus>().is_err());
    }
}
