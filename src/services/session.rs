use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::auth::IdentityProvider;
use crate::config::settings::AuthConfig;
use crate::error::{PaywatchError, Result};
use crate::models::{Identity, UserProfile};
use crate::store::DocumentStore;
use crate::ui::render::{render_chrome, render_user_panel, PanelKind};
use crate::ui::surface::UiSurface;
use crate::ui::toast::ToastManager;
use crate::ui::LoadingGate;

/// Cancellation token tied to the identity lifetime.
///
/// A scope is issued against the current identity epoch and goes stale
/// on any subsequent identity change. Writers check the scope around
/// every suspension point and no-op once it is stale, so a write
/// started under one identity can never land after sign-out.
#[derive(Clone)]
pub struct IdentityScope {
    epoch: u64,
    counter: Arc<AtomicU64>,
}

impl IdentityScope {
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.epoch
    }
}

/// Observer of identity changes. Observers are awaited in registration
/// order, so everything an earlier observer sets up is visible to later
/// ones and happens-before any notification delivery for the new
/// identity.
#[async_trait]
pub trait IdentityObserver: Send + Sync {
    async fn identity_changed(&self, identity: Option<Identity>);
}

/// Owns the current authenticated identity and its change fan-out.
pub struct SessionService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    surface: Arc<dyn UiSurface>,
    toasts: Arc<ToastManager>,
    loading: Arc<LoadingGate>,
    config: AuthConfig,
    current: RwLock<Option<Identity>>,
    observers: RwLock<Vec<Arc<dyn IdentityObserver>>>,
    epoch: Arc<AtomicU64>,
}

impl SessionService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        surface: Arc<dyn UiSurface>,
        toasts: Arc<ToastManager>,
        loading: Arc<LoadingGate>,
        config: AuthConfig,
    ) -> Self {
        Self {
            provider,
            store,
            surface,
            toasts,
            loading,
            config,
            current: RwLock::new(None),
            observers: RwLock::new(Vec::new()),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register an identity observer. Registration order is fan-out
    /// order.
    pub async fn add_observer(&self, observer: Arc<dyn IdentityObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Process-start identity fan-out (signed out).
    pub async fn start(&self) {
        self.apply_identity(None, false).await;
    }

    /// Current identity, if signed in
    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Issue a cancellation scope against the current identity epoch.
    pub fn scope(&self) -> IdentityScope {
        IdentityScope {
            epoch: self.epoch.load(Ordering::SeqCst),
            counter: Arc::clone(&self.epoch),
        }
    }

    /// Sign an existing user in with email and password.
    ///
    /// Failures are surfaced as toasts before being returned; callers
    /// may ignore the result.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            self.toasts.error("Please fill in all fields");
            return Err(PaywatchError::validation("missing login fields"));
        }

        let _guard = self.loading.acquire();
        match self.provider.sign_in(email, password).await {
            Ok(identity) => {
                self.apply_identity(Some(identity), true).await;
                self.toasts.success("Login successful!");
                Ok(())
            }
            Err(err) => {
                error!("Login error: {}", err);
                self.toasts.error(&err.user_message());
                Err(err.into())
            }
        }
    }

    /// Create a new account and sign it in.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<()> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            self.toasts.error("Please fill in all fields");
            return Err(PaywatchError::validation("missing signup fields"));
        }
        if password.len() < self.config.min_password_len {
            self.toasts.error(&format!(
                "Password must be at least {} characters",
                self.config.min_password_len
            ));
            return Err(PaywatchError::validation("password too short"));
        }

        let _guard = self.loading.acquire();
        match self.provider.sign_up(name, email, password).await {
            Ok(identity) => {
                self.apply_identity(Some(identity), true).await;
                self.toasts.success("Account created successfully!");
                Ok(())
            }
            Err(err) => {
                error!("Signup error: {}", err);
                self.toasts.error(&err.user_message());
                Err(err.into())
            }
        }
    }

    /// Run the federated popup flow.
    pub async fn login_federated(&self) -> Result<()> {
        let _guard = self.loading.acquire();
        match self.provider.sign_in_federated().await {
            Ok(identity) => {
                self.apply_identity(Some(identity), true).await;
                self.toasts.success("Federated login successful!");
                Ok(())
            }
            Err(err) => {
                error!("Federated auth error: {}", err);
                self.toasts.error(&err.user_message());
                Err(err.into())
            }
        }
    }

    /// Sign the current user out.
    pub async fn sign_out(&self) -> Result<()> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.apply_identity(None, false).await;
                self.toasts.success("Logged out successfully");
                Ok(())
            }
            Err(err) => {
                error!("Logout error: {}", err);
                self.toasts.error("Error logging out");
                Err(err.into())
            }
        }
    }

    /// Apply an identity change: advance the epoch, persist the profile
    /// projection, fan out to observers in registration order, then
    /// update chrome and the user panel.
    ///
    /// Observers run before the chrome render so listener tasks of the
    /// previous identity are gone by the time the new chrome lands and
    /// cannot overwrite it with stale state.
    async fn apply_identity(&self, identity: Option<Identity>, welcome: bool) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.current.write().await = identity.clone();

        if let Some(identity) = &identity {
            info!("Identity changed: {}", identity.uid);
            if let Err(err) = self.persist_profile(identity).await {
                // Projection refresh is best-effort, like the rest of
                // the store writes.
                error!("Error saving profile projection: {}", err);
            }
        } else {
            info!("Identity cleared");
        }

        let observers = self.observers.read().await.clone();
        for observer in observers {
            observer.identity_changed(identity.clone()).await;
        }

        self.surface
            .set_chrome(render_chrome(identity.as_ref(), false));
        self.surface
            .apply_panel(PanelKind::UserInfo, render_user_panel(identity.as_ref()));

        if identity.is_some() && welcome {
            self.toasts.success("Welcome back!");
        }
    }

    /// Idempotent merge-upsert of the profile projection. First-seen
    /// identities additionally get default subscription fields and a
    /// creation timestamp.
    async fn persist_profile(&self, identity: &Identity) -> Result<()> {
        let now = Utc::now();
        let profile = match self.store.get_profile(&identity.uid).await? {
            Some(mut existing) => {
                existing.refresh_from_identity(identity, now);
                existing
            }
            None => UserProfile::from_identity(identity, now),
        };
        self.store.upsert_profile(&profile).await?;
        debug!("Profile projection saved for {}", identity.uid);
        Ok(())
    }
}
