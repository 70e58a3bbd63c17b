pub mod constants;
pub mod settings;

pub use settings::{AuthConfig, BillingConfig, Config, FeatureFlags, LoggingConfig, UiConfig};
