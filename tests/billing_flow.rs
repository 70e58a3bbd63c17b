// Billing simulation pipeline: purchases, projections, events, panels

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use paywatch::checkout::HostedCheckoutStub;
use paywatch::models::{ActivityUpdate, Severity, SubscriptionStatus};
use paywatch::ui::{PanelKind, PanelView, RecordingSurface};
use paywatch::{ContainerBuilder, DocumentStore, MemoryStore};

use common::{settle, started_container};

#[tokio::test]
async fn start_subscription_writes_record_projection_and_event() {
    let (container, _surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Buyer", "buyer@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    let before = Utc::now();
    billing.start_subscription("plan_basic").await.unwrap();

    let records = store.list_subscriptions(&uid).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.user_id, uid);
    assert_eq!(record.status, SubscriptionStatus::Active);
    assert_eq!(record.plan_name.as_deref(), Some("Basic"));
    assert_eq!(record.amount, 9);
    assert!(record.created_at >= before);
    let next_billing = record.next_billing_date.unwrap();
    assert!(next_billing >= before + chrono::Duration::days(29));

    let profile = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(profile.subscription.status, SubscriptionStatus::Active);
    assert_eq!(profile.subscription.plan_name.as_deref(), Some("Basic"));
    assert_eq!(profile.subscription.amount, Some(9));

    let events = store.recent_events(&uid, 10).await.unwrap();
    let created: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == "customer.subscription.created")
        .collect();
    assert_eq!(created.len(), 1);
    assert!(created[0].timestamp >= before);
}

#[tokio::test]
async fn repeated_purchases_keep_a_single_active_record() {
    let (container, _surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Repeat", "repeat@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    billing.start_subscription("plan_basic").await.unwrap();
    billing.start_subscription("plan_pro").await.unwrap();

    let records = store.list_subscriptions(&uid).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].plan_name.as_deref(), Some("Pro"));
    assert_eq!(records[0].amount, 19);
}

#[tokio::test]
async fn start_subscription_signed_out_prompts_login_and_writes_nothing() {
    let (container, surface) = started_container().await;
    let billing = container.billing();

    assert!(billing.start_subscription("plan_basic").await.is_err());

    assert_eq!(surface.login_prompts(), 1);
    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Please log in to subscribe".to_string()));
    assert!(!surface.loading_visible());
}

#[tokio::test]
async fn unknown_plan_is_rejected() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();

    session
        .signup("Curious", "curious@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    assert!(billing.start_subscription("plan_platinum").await.is_err());
    assert!(container
        .store()
        .list_subscriptions(&uid)
        .await
        .unwrap()
        .is_empty());
    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Unknown subscription plan".to_string()));
}

#[tokio::test]
async fn cancellation_mutates_only_the_projection() {
    let (container, _surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Canceller", "cancel@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    billing.start_subscription("plan_basic").await.unwrap();
    billing.simulate_cancellation().await.unwrap();

    // Projection cancelled, plan cleared.
    let profile = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(profile.subscription.status, SubscriptionStatus::Cancelled);
    assert!(profile.subscription.plan_name.is_none());

    // The earlier subscription record is intentionally untouched.
    let records = store.list_subscriptions(&uid).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SubscriptionStatus::Active);

    // Exactly one deletion event, and no record was deleted.
    let events = store.recent_events(&uid, 10).await.unwrap();
    let deleted: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == "customer.subscription.deleted")
        .collect();
    assert_eq!(deleted.len(), 1);
}

#[tokio::test]
async fn cancellation_signed_out_is_a_store_no_op() {
    let (container, surface) = started_container().await;
    let billing = container.billing();

    assert!(billing.simulate_cancellation().await.is_err());
    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Please log in first".to_string()));
}

#[tokio::test]
async fn plan_change_diverges_projection_from_record() {
    let (container, _surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Changer", "change@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    billing.start_subscription("plan_basic").await.unwrap();
    billing.simulate_plan_change().await.unwrap();

    // The projection moved to Pro; the record still says Basic.
    let profile = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(profile.subscription.plan_name.as_deref(), Some("Pro"));
    assert_eq!(profile.subscription.amount, Some(19));

    let records = store.list_subscriptions(&uid).await.unwrap();
    assert_eq!(records[0].plan_name.as_deref(), Some("Basic"));
    assert_eq!(records[0].amount, 9);

    let events = store.recent_events(&uid, 10).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == "customer.subscription.updated"));
}

#[tokio::test]
async fn feed_panels_cap_at_ten_newest_first() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let store = container.store();

    session
        .signup("Flooder", "flood@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;
    settle().await;

    for n in 0..15 {
        store
            .add_activity(&ActivityUpdate::new(
                &uid,
                &format!("update {}", n),
                Severity::Info,
            ))
            .await
            .unwrap();
    }
    settle().await;

    match surface.panel(PanelKind::Activity).unwrap() {
        PanelView::Feed(entries) => {
            assert_eq!(entries.len(), 10);
            assert_eq!(entries[0].message, "update 14");
        }
        other => panic!("expected feed, got {:?}", other),
    }
}

#[tokio::test]
async fn clear_test_data_is_scoped_and_resets_panels() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let shell = container.shell();
    let billing = container.billing();
    let store = container.store();

    // First user leaves records behind.
    session
        .signup("Keeper", "keeper@example.com", "password1")
        .await
        .unwrap();
    let keeper_uid = session.current().await.unwrap().uid;
    store
        .add_activity(&ActivityUpdate::new(&keeper_uid, "keep me", Severity::Info))
        .await
        .unwrap();
    session.sign_out().await.unwrap();

    // Second user accumulates and clears.
    session
        .signup("Cleaner", "cleaner@example.com", "password1")
        .await
        .unwrap();
    let cleaner_uid = session.current().await.unwrap().uid;
    store
        .add_activity(&ActivityUpdate::new(&cleaner_uid, "wipe me", Severity::Info))
        .await
        .unwrap();
    billing
        .simulate_webhook("invoice.payment_succeeded", serde_json::json!({"amount": 9}))
        .await
        .unwrap();
    settle().await;

    shell.clear_test_data().await.unwrap();
    settle().await;

    assert!(store
        .recent_activity(&cleaner_uid, 10)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .recent_events(&cleaner_uid, 10)
        .await
        .unwrap()
        .is_empty());
    // Other users' records are untouched.
    assert_eq!(store.recent_activity(&keeper_uid, 10).await.unwrap().len(), 1);

    assert_eq!(
        surface.panel(PanelKind::Activity).unwrap(),
        PanelView::Placeholder("Waiting for real-time updates...".to_string())
    );
    assert_eq!(
        surface.panel(PanelKind::Events).unwrap(),
        PanelView::Placeholder("No webhook events received".to_string())
    );
    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Test data cleared!".to_string()));
}

#[tokio::test]
async fn store_failure_surfaces_one_error_toast_and_dismisses_loading() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();

    session
        .signup("Unlucky", "unlucky@example.com", "password1")
        .await
        .unwrap();

    container.store().close().await.unwrap();
    assert!(billing.start_subscription("plan_basic").await.is_err());

    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Error creating subscription. Please try again.".to_string()));
    assert!(!surface.loading_visible());
}

#[tokio::test]
async fn purchase_in_flight_across_sign_out_never_lands() {
    // Checkout with real latency so the identity can change mid-flight.
    let surface = Arc::new(RecordingSurface::new());
    let container = ContainerBuilder::new()
        .with_config(paywatch::Config::default())
        .with_store(Arc::new(MemoryStore::new()))
        .with_checkout(Arc::new(HostedCheckoutStub::new(Duration::from_millis(150))))
        .with_surface(surface.clone())
        .build()
        .await
        .unwrap();
    container.start().await.unwrap();

    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Ghost", "ghost@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    let purchase = {
        let billing = billing.clone();
        tokio::spawn(async move { billing.start_subscription("plan_basic").await })
    };
    tokio::time::sleep(Duration::from_millis(40)).await;
    session.sign_out().await.unwrap();

    purchase.await.unwrap().unwrap();

    // The scope went stale during checkout: nothing was written.
    assert!(store.list_subscriptions(&uid).await.unwrap().is_empty());
    assert!(store.recent_events(&uid, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn webhook_sequence_appends_all_events_in_order() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();
    let store = container.store();

    session
        .signup("Replayer", "replay@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    billing.run_webhook_sequence().await.unwrap();

    let events = store.recent_events(&uid, 10).await.unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert!(types.contains(&"invoice.payment_succeeded"));
    assert!(types.contains(&"customer.subscription.updated"));
    assert!(types.contains(&"invoice.payment_failed"));

    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Webhook events simulated!".to_string()));
}

#[tokio::test]
async fn management_surface_requires_sign_in() {
    let (container, surface) = started_container().await;
    let billing = container.billing();

    assert!(billing.open_management_surface().await.is_err());
    assert_eq!(surface.management_opens(), 0);

    container
        .session()
        .signup("Manager", "manager@example.com", "password1")
        .await
        .unwrap();
    billing.open_management_surface().await.unwrap();
    assert_eq!(surface.management_opens(), 1);
}

#[tokio::test]
async fn subscription_change_renders_panel_from_the_record() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let billing = container.billing();

    session
        .signup("Viewer", "viewer@example.com", "password1")
        .await
        .unwrap();
    billing.start_subscription("plan_basic").await.unwrap();
    settle().await;

    match surface.panel(PanelKind::Subscription).unwrap() {
        PanelView::Details(fields) => {
            assert!(fields.contains(&("Plan".to_string(), "Basic".to_string())));
            assert!(fields.contains(&("Amount".to_string(), "$9".to_string())));
        }
        other => panic!("expected details, got {:?}", other),
    }

    // The derived activity entry for the record change is on the panel.
    match surface.panel(PanelKind::Activity).unwrap() {
        PanelView::Feed(entries) => {
            assert!(entries
                .iter()
                .any(|e| e.message == "New subscription created: Basic"));
        }
        other => panic!("expected feed, got {:?}", other),
    }
}
