use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::constants::ANONYMOUS_DISPLAY_NAME;
use crate::models::identity::Identity;
use crate::models::subscription::{SubscriptionRecord, SubscriptionStatus};

/// Durable profile projection of an identity, including the
/// denormalized subscription fields the dashboard renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user id
    pub uid: String,
    /// Email address
    pub email: String,
    /// Display name, defaulted when the identity carries none
    pub display_name: String,
    /// Profile photo reference
    pub photo_url: Option<String>,
    /// First-seen instant
    pub created_at: DateTime<Utc>,
    /// Last write instant
    pub updated_at: DateTime<Utc>,
    /// Last login instant
    pub last_login: DateTime<Utc>,
    /// Denormalized subscription fields
    pub subscription: ProfileSubscription,
}

/// Denormalized subscription fields carried on the profile.
///
/// Kept in sync with the subscription record only on purchase; the
/// simulated plan-change and cancellation paths mutate this projection
/// alone, so it can disagree with the record feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSubscription {
    pub status: SubscriptionStatus,
    pub plan_name: Option<String>,
    pub amount: Option<i64>,
    pub next_billing_date: Option<DateTime<Utc>>,
}

impl ProfileSubscription {
    /// Default fields stamped onto first-seen profiles
    pub fn none() -> Self {
        Self {
            status: SubscriptionStatus::None,
            plan_name: None,
            amount: None,
            next_billing_date: None,
        }
    }

    /// Projection matching a subscription record
    pub fn from_record(record: &SubscriptionRecord) -> Self {
        Self {
            status: record.status,
            plan_name: record.plan_name.clone(),
            amount: Some(record.amount),
            next_billing_date: record.next_billing_date,
        }
    }
}

impl UserProfile {
    /// Build a fresh profile projection for a first-seen identity.
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity
                .display_name
                .clone()
                .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string()),
            photo_url: identity.photo_url.clone(),
            created_at: now,
            updated_at: now,
            last_login: now,
            subscription: ProfileSubscription::none(),
        }
    }

    /// Refresh the identity-derived fields, leaving the subscription
    /// projection and creation instant untouched.
    pub fn refresh_from_identity(&mut self, identity: &Identity, now: DateTime<Utc>) {
        self.email = identity.email.clone();
        self.display_name = identity
            .display_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string());
        self.photo_url = identity.photo_url.clone();
        self.last_login = now;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: Option<&str>) -> Identity {
        Identity {
            uid: "u1".into(),
            email: "user@example.com".into(),
            display_name: name.map(String::from),
            photo_url: None,
            email_verified: true,
            last_sign_in: Utc::now(),
        }
    }

    #[test]
    fn first_seen_profile_gets_defaults() {
        let now = Utc::now();
        let profile = UserProfile::from_identity(&identity(None), now);
        assert_eq!(profile.display_name, ANONYMOUS_DISPLAY_NAME);
        assert_eq!(profile.subscription.status, SubscriptionStatus::None);
        assert_eq!(profile.created_at, now);
    }

    #[test]
    fn refresh_keeps_created_at_and_subscription() {
        let created = Utc::now();
        let mut profile = UserProfile::from_identity(&identity(Some("Ada")), created);
        profile.subscription.status = SubscriptionStatus::Active;

        let later = created + chrono::Duration::minutes(5);
        profile.refresh_from_identity(&identity(Some("Ada L.")), later);

        assert_eq!(profile.created_at, created);
        assert_eq!(profile.display_name, "Ada L.");
        assert_eq!(profile.subscription.status, SubscriptionStatus::Active);
        assert_eq!(profile.last_login, later);
    }
}
