use std::env;

use serde::{Deserialize, Serialize};

use crate::config::constants;

/// Main configuration container for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Authentication settings
    pub auth: AuthConfig,
    /// Billing simulation settings
    pub billing: BillingConfig,
    /// Dashboard/UI settings
    pub ui: UiConfig,
    /// Logging configuration settings
    pub logging: LoggingConfig,
    /// Feature flags
    pub features: FeatureFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            billing: BillingConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            auth: AuthConfig::load(),
            billing: BillingConfig::load(),
            ui: UiConfig::load(),
            logging: LoggingConfig::load(),
            features: FeatureFlags::load(),
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length accepted at signup
    pub min_password_len: usize,
    /// Identifier of the federated login provider
    pub federated_provider: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: constants::MIN_PASSWORD_LEN,
            federated_provider: "google.com".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn load() -> Self {
        let min_password_len = env::var("PAYWATCH_MIN_PASSWORD_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(constants::MIN_PASSWORD_LEN);
        let federated_provider = env::var("PAYWATCH_FEDERATED_PROVIDER")
            .unwrap_or_else(|_| "google.com".to_string());

        Self {
            min_password_len,
            federated_provider,
        }
    }
}

/// Billing simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// ISO currency code applied to simulated subscriptions
    pub currency: String,
    /// Days until the next billing instant of a fresh subscription
    pub billing_cycle_days: i64,
    /// Simulated hosted-checkout latency in milliseconds
    pub checkout_latency_ms: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            billing_cycle_days: constants::BILLING_CYCLE_DAYS,
            checkout_latency_ms: constants::DEFAULT_CHECKOUT_LATENCY_MS,
        }
    }
}

impl BillingConfig {
    pub fn load() -> Self {
        let currency = env::var("PAYWATCH_CURRENCY").unwrap_or_else(|_| "usd".to_string());
        let billing_cycle_days = env::var("PAYWATCH_BILLING_CYCLE_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(constants::BILLING_CYCLE_DAYS);
        let checkout_latency_ms = env::var("PAYWATCH_CHECKOUT_LATENCY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(constants::DEFAULT_CHECKOUT_LATENCY_MS);

        Self {
            currency,
            billing_cycle_days,
            checkout_latency_ms,
        }
    }
}

/// Dashboard/UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Maximum entries kept visible per feed panel
    pub feed_panel_limit: usize,
    /// Toast lifetime before auto-dismiss, in milliseconds
    pub toast_duration_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            feed_panel_limit: constants::FEED_PANEL_LIMIT,
            toast_duration_ms: constants::DEFAULT_TOAST_DURATION_MS,
        }
    }
}

impl UiConfig {
    pub fn load() -> Self {
        let feed_panel_limit = env::var("PAYWATCH_FEED_PANEL_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(constants::FEED_PANEL_LIMIT);
        let toast_duration_ms = env::var("PAYWATCH_TOAST_DURATION_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(constants::DEFAULT_TOAST_DURATION_MS);

        Self {
            feed_panel_limit,
            toast_duration_ms,
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn load() -> Self {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Self { level }
    }
}

/// Feature flags configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Test mode: zero checkout latency, deterministic federated login
    pub test_mode: bool,
    /// Debug mode: extra store-change logging
    pub debug_mode: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            test_mode: false,
            debug_mode: false,
        }
    }
}

impl FeatureFlags {
    pub fn load() -> Self {
        let test_mode = env::var("PAYWATCH_TEST_MODE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        let debug_mode = env::var("PAYWATCH_DEBUG_MODE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            test_mode,
            debug_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.ui.feed_panel_limit, 10);
        assert_eq!(config.ui.toast_duration_ms, 5_000);
        assert_eq!(config.billing.billing_cycle_days, 30);
        assert_eq!(config.auth.min_password_len, 6);
        assert!(!config.features.test_mode);
    }
}
