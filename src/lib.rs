// Re-export core functionality for external use
pub use async_trait::async_trait;

// Core module definitions
pub mod app;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod container;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod ui;

// Unified error handling
pub use error::{AppError, PaywatchError, Result};

// Container and dependency injection
pub use container::{AppContainer, ContainerBuilder};

pub use config::settings::Config;

// Store abstractions
pub use store::{
    ChangeKind, DocChange, DocumentStore, MemoryStore, SnapshotListener, StoreError,
};

// Model exports
pub use models::{
    ActivityUpdate, BillingEvent, Identity, Plan, PlanCatalog, Severity, SubscriptionRecord,
    SubscriptionStatus, UserProfile,
};

// Service exports
pub use services::{BillingService, IdentityObserver, IdentityScope, RealtimeService,
    SessionService};

// Shell
pub use app::Shell;

// Version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

// Common type aliases
pub type UserId = String;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AppContainer, AppError, Config, ContainerBuilder, DocumentStore, Identity,
        PaywatchError, Result, NAME, VERSION,
    };

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, instrument, warn};
}
