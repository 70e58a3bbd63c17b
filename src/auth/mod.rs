pub mod directory;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::PaywatchError;
use crate::models::Identity;

pub use directory::{DirectoryProvider, FederatedOutcome};

/// Auth Result type
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error codes surfaced by the identity provider, mirroring the
/// backend's error-code vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCode {
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,
    PopupClosedByUser,
    PopupBlocked,
    Other,
}

/// Identity-provider failure: a code plus the provider's raw text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{detail}")]
pub struct AuthError {
    pub code: AuthCode,
    pub detail: String,
}

impl AuthError {
    pub fn new(code: AuthCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Fixed code-to-message table; unmapped codes fall back to the
    /// provider's raw error text.
    pub fn user_message(&self) -> String {
        match self.code {
            AuthCode::UserNotFound => "No account found with this email".to_string(),
            AuthCode::WrongPassword => "Incorrect password".to_string(),
            AuthCode::EmailAlreadyInUse => "Email is already registered".to_string(),
            AuthCode::WeakPassword => "Password is too weak".to_string(),
            AuthCode::InvalidEmail => "Invalid email address".to_string(),
            AuthCode::PopupClosedByUser => "Authentication cancelled".to_string(),
            AuthCode::PopupBlocked => {
                "Popup blocked. Please allow popups and try again".to_string()
            }
            AuthCode::Other => {
                if self.detail.is_empty() {
                    "An error occurred".to_string()
                } else {
                    self.detail.clone()
                }
            }
        }
    }
}

impl From<AuthError> for PaywatchError {
    fn from(err: AuthError) -> Self {
        PaywatchError::Authentication(err.user_message())
    }
}

/// External identity provider seam: email/password plus one federated
/// popup flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign an existing user in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// Create a new user and sign them in
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Identity>;

    /// Run the federated popup flow
    async fn sign_in_federated(&self) -> Result<Identity>;

    /// Invalidate the provider-side session
    async fn sign_out(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_codes_use_the_fixed_table() {
        let err = AuthError::new(AuthCode::WrongPassword, "auth/wrong-password");
        assert_eq!(err.user_message(), "Incorrect password");

        let err = AuthError::new(AuthCode::PopupBlocked, "auth/popup-blocked");
        assert_eq!(
            err.user_message(),
            "Popup blocked. Please allow popups and try again"
        );
    }

    #[test]
    fn unmapped_codes_fall_back_to_raw_text() {
        let err = AuthError::new(AuthCode::Other, "network unreachable");
        assert_eq!(err.user_message(), "network unreachable");

        let err = AuthError::new(AuthCode::Other, "");
        assert_eq!(err.user_message(), "An error occurred");
    }
}
