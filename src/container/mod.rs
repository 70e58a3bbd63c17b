use std::sync::Arc;

use crate::app::Shell;
use crate::auth::IdentityProvider;
use crate::checkout::CheckoutClient;
use crate::config::settings::Config;
use crate::error::Result;
use crate::services::{BillingService, RealtimeService, SessionService};
use crate::store::DocumentStore;
use crate::ui::surface::UiSurface;
use crate::ui::toast::ToastManager;
use crate::ui::LoadingGate;

pub mod builder;

pub use builder::ContainerBuilder;

/// Dependency-injection container: every service is constructed once at
/// process start and handed out by reference.
#[derive(Clone)]
pub struct AppContainer {
    config: Arc<Config>,
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn IdentityProvider>,
    checkout: Arc<dyn CheckoutClient>,
    surface: Arc<dyn UiSurface>,
    toasts: Arc<ToastManager>,
    loading: Arc<LoadingGate>,
    session: Arc<SessionService>,
    realtime: Arc<RealtimeService>,
    billing: Arc<BillingService>,
    shell: Arc<Shell>,
}

impl AppContainer {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn provider(&self) -> Arc<dyn IdentityProvider> {
        self.provider.clone()
    }

    pub fn checkout(&self) -> Arc<dyn CheckoutClient> {
        self.checkout.clone()
    }

    pub fn surface(&self) -> Arc<dyn UiSurface> {
        self.surface.clone()
    }

    pub fn toasts(&self) -> Arc<ToastManager> {
        self.toasts.clone()
    }

    pub fn loading(&self) -> Arc<LoadingGate> {
        self.loading.clone()
    }

    pub fn session(&self) -> Arc<SessionService> {
        self.session.clone()
    }

    pub fn realtime(&self) -> Arc<RealtimeService> {
        self.realtime.clone()
    }

    pub fn billing(&self) -> Arc<BillingService> {
        self.billing.clone()
    }

    pub fn shell(&self) -> Arc<Shell> {
        self.shell.clone()
    }

    /// Start the application: bootstraps the shell, which runs the
    /// initial identity fan-out.
    pub async fn start(&self) -> Result<()> {
        self.shell.start().await
    }

    /// Health check across the shared resources
    pub async fn health_check(&self) -> Result<bool> {
        let store_ok = self.store.health_check().await.unwrap_or(false);
        Ok(store_ok)
    }

    /// Tear down listeners and release the store
    pub async fn shutdown(&self) -> Result<()> {
        self.realtime.detach().await;
        self.store.close().await?;
        Ok(())
    }
}

// Internal constructor (used by the builder only)
impl AppContainer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: Arc<Config>,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        checkout: Arc<dyn CheckoutClient>,
        surface: Arc<dyn UiSurface>,
        toasts: Arc<ToastManager>,
        loading: Arc<LoadingGate>,
        session: Arc<SessionService>,
        realtime: Arc<RealtimeService>,
        billing: Arc<BillingService>,
        shell: Arc<Shell>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
            checkout,
            surface,
            toasts,
            loading,
            session,
            realtime,
            billing,
            shell,
        }
    }
}
