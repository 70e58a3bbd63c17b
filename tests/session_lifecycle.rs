// Session identity lifecycle and realtime listener reconciliation

mod common;

use std::sync::Arc;

use paywatch::auth::{DirectoryProvider, FederatedOutcome};
use paywatch::models::{ActivityUpdate, Severity};
use paywatch::ui::{PanelKind, PanelView, RecordingSurface};
use paywatch::{ContainerBuilder, DocumentStore};

use common::{settle, started_container};

#[tokio::test]
async fn listener_count_tracks_identity_toggling() {
    let (container, _surface) = started_container().await;
    let session = container.session();
    let store = container.store();

    assert_eq!(store.live_listeners(), 0);

    session
        .signup("Toggler", "toggle@example.com", "password1")
        .await
        .unwrap();
    assert_eq!(store.live_listeners(), 4);

    // Repeated toggling never leaks or duplicates subscriptions.
    for _ in 0..3 {
        session.sign_out().await.unwrap();
        assert_eq!(store.live_listeners(), 0);

        session
            .login("toggle@example.com", "password1")
            .await
            .unwrap();
        assert_eq!(store.live_listeners(), 4);
    }

    container.shutdown().await.unwrap();
}

#[tokio::test]
async fn validation_failures_surface_a_toast_and_skip_the_provider() {
    let (container, surface) = started_container().await;
    let session = container.session();

    assert!(session.login("", "").await.is_err());
    assert!(session.signup("Ada", "ada@example.com", "shor").await.is_err());

    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"Please fill in all fields".to_string()));
    assert!(messages.contains(&"Password must be at least 6 characters".to_string()));

    // No provider call was made: the unknown account still does not exist.
    assert!(session.current().await.is_none());
    assert_eq!(container.store().live_listeners(), 0);
}

#[tokio::test]
async fn auth_errors_map_through_the_fixed_table() {
    let provider = Arc::new(DirectoryProvider::new());
    let surface = Arc::new(RecordingSurface::new());
    let container = ContainerBuilder::new()
        .with_store(Arc::new(paywatch::MemoryStore::new()))
        .with_provider(provider.clone())
        .with_surface(surface.clone())
        .with_config(paywatch::Config::default())
        .build()
        .await
        .unwrap();
    container.start().await.unwrap();
    let session = container.session();

    assert!(session.login("ghost@example.com", "pw12345").await.is_err());

    session
        .signup("Ada", "ada@example.com", "password1")
        .await
        .unwrap();
    session.sign_out().await.unwrap();
    assert!(session
        .signup("Eve", "ada@example.com", "password2")
        .await
        .is_err());
    assert!(session.login("ada@example.com", "wrong-pass").await.is_err());

    provider.set_federated_outcome(FederatedOutcome::ClosedByUser);
    assert!(session.login_federated().await.is_err());

    let messages: Vec<String> = surface.toasts().iter().map(|t| t.message.clone()).collect();
    assert!(messages.contains(&"No account found with this email".to_string()));
    assert!(messages.contains(&"Email is already registered".to_string()));
    assert!(messages.contains(&"Incorrect password".to_string()));
    assert!(messages.contains(&"Authentication cancelled".to_string()));

    // Failed actions never change identity state.
    assert!(session.current().await.is_none());
}

#[tokio::test]
async fn chrome_and_user_panel_follow_identity() {
    let (container, surface) = started_container().await;
    let session = container.session();

    let chrome = surface.chrome().unwrap();
    assert!(chrome.login_visible);
    assert!(chrome.signup_visible);
    assert!(chrome.logout_label.is_none());

    session
        .signup("Demo User", "demo@example.com", "password1")
        .await
        .unwrap();

    let chrome = surface.chrome().unwrap();
    assert_eq!(chrome.logout_label.as_deref(), Some("Logout (Demo User)"));
    match surface.panel(PanelKind::UserInfo).unwrap() {
        PanelView::Details(fields) => {
            assert!(fields.contains(&("Email".to_string(), "demo@example.com".to_string())));
        }
        other => panic!("expected details, got {:?}", other),
    }

    session.sign_out().await.unwrap();
    assert!(surface.chrome().unwrap().login_visible);
    assert!(surface
        .panel(PanelKind::UserInfo)
        .unwrap()
        .is_placeholder());
}

#[tokio::test]
async fn first_sign_in_persists_a_default_profile_projection() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let store = container.store();

    session
        .signup("Fresh", "fresh@example.com", "password1")
        .await
        .unwrap();
    let uid = session.current().await.unwrap().uid;

    let profile = store.get_profile(&uid).await.unwrap().unwrap();
    assert_eq!(profile.display_name, "Fresh");
    assert_eq!(
        profile.subscription.status,
        paywatch::SubscriptionStatus::None
    );

    // The profile snapshot arrives through the listener and renders the
    // subscription panel from the (empty) projection.
    settle().await;
    assert_eq!(
        surface.panel(PanelKind::Subscription).unwrap(),
        PanelView::Placeholder("No active subscription".to_string())
    );
}

#[tokio::test]
async fn notifications_for_a_previous_identity_never_render() {
    let (container, surface) = started_container().await;
    let session = container.session();
    let store = container.store();

    session
        .signup("First", "first@example.com", "password1")
        .await
        .unwrap();
    let first_uid = session.current().await.unwrap().uid;
    settle().await;

    // Switch identity; the first user's listeners are torn down before
    // the second user's are established.
    session
        .signup("Second", "second@example.com", "password1")
        .await
        .unwrap();
    settle().await;

    store
        .add_activity(&ActivityUpdate::new(
            &first_uid,
            "late delivery for the first user",
            Severity::Info,
        ))
        .await
        .unwrap();
    settle().await;

    match surface.panel(PanelKind::Activity).unwrap() {
        PanelView::Placeholder(_) => {}
        PanelView::Feed(entries) => {
            assert!(entries
                .iter()
                .all(|e| e.message != "late delivery for the first user"));
        }
        other => panic!("unexpected panel view: {:?}", other),
    }
}
