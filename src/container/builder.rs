use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::Shell;
use crate::auth::{DirectoryProvider, IdentityProvider};
use crate::checkout::{CheckoutClient, HostedCheckoutStub};
use crate::config::settings::Config;
use crate::container::AppContainer;
use crate::error::Result;
use crate::services::{BillingService, RealtimeService, SessionService};
use crate::store::{DocumentStore, MemoryStore};
use crate::ui::surface::{TerminalSurface, UiSurface};
use crate::ui::toast::ToastManager;
use crate::ui::LoadingGate;

/// Builds the application container, wiring every service with its
/// dependencies. Collaborator seams (store, identity provider,
/// checkout, surface) can be swapped before building.
pub struct ContainerBuilder {
    config: Option<Arc<Config>>,
    store: Option<Arc<dyn DocumentStore>>,
    provider: Option<Arc<dyn IdentityProvider>>,
    checkout: Option<Arc<dyn CheckoutClient>>,
    surface: Option<Arc<dyn UiSurface>>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            provider: None,
            checkout: None,
            surface: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_checkout(mut self, checkout: Arc<dyn CheckoutClient>) -> Self {
        self.checkout = Some(checkout);
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn UiSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Build the container. Services are constructed and the identity
    /// observers registered in bootstrap order (Realtime before
    /// Billing); nothing runs until [`AppContainer::start`].
    pub async fn build(self) -> Result<AppContainer> {
        info!("Building application container");

        let config = self.config.unwrap_or_else(|| {
            info!("Loading configuration from environment");
            Arc::new(Config::load())
        });

        let store: Arc<dyn DocumentStore> = self.store.unwrap_or_else(|| {
            info!("Using in-memory document store");
            Arc::new(MemoryStore::new())
        });

        let provider: Arc<dyn IdentityProvider> = self
            .provider
            .unwrap_or_else(|| Arc::new(DirectoryProvider::new()));

        let checkout_latency = if config.features.test_mode {
            Duration::ZERO
        } else {
            Duration::from_millis(config.billing.checkout_latency_ms)
        };
        let checkout: Arc<dyn CheckoutClient> = self
            .checkout
            .unwrap_or_else(|| Arc::new(HostedCheckoutStub::new(checkout_latency)));

        let surface: Arc<dyn UiSurface> =
            self.surface.unwrap_or_else(|| Arc::new(TerminalSurface::new()));

        let toasts = Arc::new(ToastManager::new(
            surface.clone(),
            Duration::from_millis(config.ui.toast_duration_ms),
        ));
        let loading = Arc::new(LoadingGate::new(surface.clone()));

        let session = Arc::new(SessionService::new(
            provider.clone(),
            store.clone(),
            surface.clone(),
            toasts.clone(),
            loading.clone(),
            config.auth.clone(),
        ));

        let realtime = Arc::new(RealtimeService::new(
            store.clone(),
            surface.clone(),
            toasts.clone(),
            config.ui.clone(),
        ));

        let billing = Arc::new(BillingService::new(
            store.clone(),
            checkout.clone(),
            session.clone(),
            surface.clone(),
            toasts.clone(),
            loading.clone(),
            config.billing.clone(),
        ));

        // Fan-out order: listeners are re-established before billing
        // reloads the current plan.
        session.add_observer(realtime.clone()).await;
        session.add_observer(billing.clone()).await;

        let shell = Arc::new(Shell::new(
            session.clone(),
            realtime.clone(),
            billing.clone(),
            store.clone(),
            toasts.clone(),
        ));

        info!("Application container built");
        Ok(AppContainer::new(
            config, store, provider, checkout, surface, toasts, loading, session, realtime,
            billing, shell,
        ))
    }

    /// Container for tests: in-memory store, zero-latency checkout.
    pub async fn build_test(surface: Arc<dyn UiSurface>) -> Result<AppContainer> {
        let mut config = Config {
            features: crate::config::settings::FeatureFlags {
                test_mode: true,
                debug_mode: true,
            },
            ..Config::default()
        };
        config.billing.checkout_latency_ms = 0;

        Self::new()
            .with_config(config)
            .with_store(Arc::new(MemoryStore::new()))
            .with_surface(surface)
            .build()
            .await
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::RecordingSurface;

    #[tokio::test]
    async fn test_container_builder() {
        let surface = Arc::new(RecordingSurface::new());
        let container = ContainerBuilder::build_test(surface).await.unwrap();

        assert!(container.health_check().await.unwrap());
        assert!(container.config().features.test_mode);

        let _session = container.session();
        let _realtime = container.realtime();
        let _billing = container.billing();
        let _shell = container.shell();

        container.shutdown().await.unwrap();
        assert!(!container.health_check().await.unwrap());
    }
}
