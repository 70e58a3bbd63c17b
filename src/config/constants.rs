/// Maximum entries kept visible in the activity and event panels
pub const FEED_PANEL_LIMIT: usize = 10;

/// Default toast lifetime before auto-dismiss
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;

/// Days until the next billing instant of a fresh subscription
pub const BILLING_CYCLE_DAYS: i64 = 30;

/// Simulated latency of the hosted-checkout session call
pub const DEFAULT_CHECKOUT_LATENCY_MS: u64 = 1_000;

/// Minimum accepted password length at signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// Placeholder shown in the activity panel before the first update
pub const ACTIVITY_PLACEHOLDER: &str = "Waiting for real-time updates...";

/// Placeholder shown in the event panel before the first event
pub const EVENTS_PLACEHOLDER: &str = "No webhook events received";

/// Placeholder shown in the subscription panel without an active plan
pub const SUBSCRIPTION_PLACEHOLDER: &str = "No active subscription";

/// Placeholder shown in the user panel while signed out
pub const USER_PLACEHOLDER: &str = "Please log in to view your information";

/// Display name used when an identity carries none
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous User";

// Synthesized billing event types, mirroring the payment platform's
// webhook vocabulary.
pub const EVENT_SUBSCRIPTION_CREATED: &str = "customer.subscription.created";
pub const EVENT_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const EVENT_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
pub const EVENT_PAYMENT_SUCCEEDED: &str = "invoice.payment_succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "invoice.payment_failed";
pub const EVENT_TRIAL_WILL_END: &str = "customer.subscription.trial_will_end";
