//! Pure view construction: `render(state) -> view`.
//!
//! Nothing here touches a surface; the returned views are applied by a
//! [`UiSurface`](crate::ui::surface::UiSurface) adapter. This keeps the
//! reconciliation logic testable without any real UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::constants::{SUBSCRIPTION_PLACEHOLDER, USER_PLACEHOLDER};
use crate::models::{
    ActivityUpdate, BillingEvent, Identity, ProfileSubscription, SubscriptionRecord,
    SubscriptionStatus,
};

/// Dashboard panel addressed by a view update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    UserInfo,
    Subscription,
    Activity,
    Events,
}

/// Rendered content of one dashboard panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelView {
    /// Empty-state message
    Placeholder(String),
    /// Labelled key/value lines
    Details(Vec<(String, String)>),
    /// Feed entries, newest first
    Feed(Vec<FeedEntryView>),
}

impl PanelView {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, PanelView::Placeholder(_))
    }
}

/// One rendered feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntryView {
    /// Short tag: severity for activity entries, event type for events
    pub tag: String,
    /// Entry body
    pub message: String,
    /// Formatted arrival time
    pub time: String,
}

/// Visibility of the authentication chrome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromeView {
    pub login_visible: bool,
    pub signup_visible: bool,
    /// Logout control label while signed in, e.g. `Logout (Ada)`
    pub logout_label: Option<String>,
    /// Whether the manage-subscription control is shown
    pub manage_visible: bool,
}

/// Content of the subscription-management surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementView {
    pub heading: String,
    pub options: Vec<String>,
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Render the authentication chrome for the current identity.
pub fn render_chrome(identity: Option<&Identity>, has_subscription: bool) -> ChromeView {
    match identity {
        Some(identity) => ChromeView {
            login_visible: false,
            signup_visible: false,
            logout_label: Some(format!("Logout ({})", identity.label())),
            manage_visible: has_subscription,
        },
        None => ChromeView {
            login_visible: true,
            signup_visible: true,
            logout_label: None,
            manage_visible: false,
        },
    }
}

/// Render the user panel for the current identity.
pub fn render_user_panel(identity: Option<&Identity>) -> PanelView {
    match identity {
        Some(identity) => PanelView::Details(vec![
            (
                "Name".to_string(),
                identity
                    .display_name
                    .clone()
                    .unwrap_or_else(|| "Not provided".to_string()),
            ),
            ("Email".to_string(), identity.email.clone()),
            ("User ID".to_string(), identity.uid.clone()),
            (
                "Email Verified".to_string(),
                if identity.email_verified { "Yes" } else { "No" }.to_string(),
            ),
            (
                "Last Sign In".to_string(),
                identity.last_sign_in.to_rfc3339(),
            ),
        ]),
        None => PanelView::Placeholder(USER_PLACEHOLDER.to_string()),
    }
}

/// Render the subscription panel from the profile's denormalized
/// subscription fields.
pub fn render_subscription_from_profile(subscription: &ProfileSubscription) -> PanelView {
    if subscription.status == SubscriptionStatus::None {
        return PanelView::Placeholder(SUBSCRIPTION_PLACEHOLDER.to_string());
    }

    PanelView::Details(vec![
        (
            "Plan".to_string(),
            subscription
                .plan_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        ("Status".to_string(), subscription.status.to_string()),
        (
            "Next Billing".to_string(),
            subscription
                .next_billing_date
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        (
            "Amount".to_string(),
            subscription
                .amount
                .map(|a| format!("${}", a))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
    ])
}

/// Render the subscription panel directly from a subscription record.
pub fn render_subscription_from_record(record: &SubscriptionRecord) -> PanelView {
    PanelView::Details(vec![
        (
            "Plan".to_string(),
            record
                .plan_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        ),
        ("Status".to_string(), record.status.to_string()),
        ("Created".to_string(), format_date(&record.created_at)),
        ("Amount".to_string(), format!("${}", record.amount)),
    ])
}

/// Render one activity update as a feed entry.
pub fn feed_entry_from_activity(update: &ActivityUpdate) -> FeedEntryView {
    FeedEntryView {
        tag: update.severity.to_string(),
        message: update.message.clone(),
        time: format_time(&update.timestamp),
    }
}

/// Render one billing event as a feed entry.
pub fn feed_entry_from_event(event: &BillingEvent) -> FeedEntryView {
    FeedEntryView {
        tag: event.event_type.clone(),
        message: event.description.clone(),
        time: format_time(&event.timestamp),
    }
}

/// Content of the stand-in subscription-management surface.
pub fn management_view() -> ManagementView {
    ManagementView {
        heading: "Subscription Management".to_string(),
        options: vec![
            "Update payment methods".to_string(),
            "Change subscription plans".to_string(),
            "View billing history".to_string(),
            "Cancel subscription".to_string(),
            "Download invoices".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    #[test]
    fn chrome_reflects_identity() {
        let signed_out = render_chrome(None, false);
        assert!(signed_out.login_visible);
        assert!(signed_out.logout_label.is_none());

        let identity = Identity {
            uid: "u1".into(),
            email: "ada@example.com".into(),
            display_name: Some("Ada".into()),
            photo_url: None,
            email_verified: true,
            last_sign_in: Utc::now(),
        };
        let signed_in = render_chrome(Some(&identity), true);
        assert!(!signed_in.login_visible);
        assert_eq!(signed_in.logout_label.as_deref(), Some("Logout (Ada)"));
        assert!(signed_in.manage_visible);
    }

    #[test]
    fn subscription_profile_placeholder_when_none() {
        let view = render_subscription_from_profile(&ProfileSubscription::none());
        assert!(view.is_placeholder());
    }

    #[test]
    fn subscription_profile_details_when_active() {
        let projection = ProfileSubscription {
            status: SubscriptionStatus::Active,
            plan_name: Some("Basic".into()),
            amount: Some(9),
            next_billing_date: None,
        };
        match render_subscription_from_profile(&projection) {
            PanelView::Details(fields) => {
                assert!(fields.contains(&("Plan".to_string(), "Basic".to_string())));
                assert!(fields.contains(&("Amount".to_string(), "$9".to_string())));
            }
            other => panic!("expected details, got {:?}", other),
        }
    }

    #[test]
    fn feed_entries_carry_tag_and_message() {
        let update = ActivityUpdate::new("u1", "User preferences updated", Severity::Success);
        let entry = feed_entry_from_activity(&update);
        assert_eq!(entry.tag, "success");
        assert_eq!(entry.message, "User preferences updated");

        let event = BillingEvent::new(
            "u1",
            "invoice.payment_succeeded",
            "Payment of $19 succeeded",
            serde_json::json!({"amount": 19}),
        );
        let entry = feed_entry_from_event(&event);
        assert_eq!(entry.tag, "invoice.payment_succeeded");
    }
}
