use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the entire application
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum PaywatchError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Billing error: {0}")]
    Billing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PaywatchError>;

/// Legacy-style alias used throughout the services
pub type AppError = PaywatchError;

impl PaywatchError {
    pub fn store<T: Into<String>>(msg: T) -> Self {
        Self::Store(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn auth<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn billing<T: Into<String>>(msg: T) -> Self {
        Self::Billing(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            PaywatchError::Store(_) => "store",
            PaywatchError::Config(_) => "config",
            PaywatchError::Authentication(_) => "auth",
            PaywatchError::Validation(_) => "validation",
            PaywatchError::Billing(_) => "billing",
            PaywatchError::Serialization(_) => "serialization",
            PaywatchError::NotFound(_) => "not_found",
            PaywatchError::ServiceUnavailable(_) => "service_unavailable",
            PaywatchError::Internal(_) => "internal",
        }
    }

    /// Whether the failure carries text meant for the user.
    /// Validation and auth errors do; the rest degrade to a generic
    /// toast message.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PaywatchError::Validation(_) | PaywatchError::Authentication(_)
        )
    }
}

impl From<serde_json::Error> for PaywatchError {
    fn from(err: serde_json::Error) -> Self {
        PaywatchError::Serialization(format!("JSON error: {}", err))
    }
}
