use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{AuthCode, AuthError, IdentityProvider, Result};
use crate::models::Identity;

/// Outcome the simulated federated popup resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FederatedOutcome {
    /// Popup completes for the given account
    Success { email: String, name: String },
    /// User closed the popup
    ClosedByUser,
    /// Browser blocked the popup
    Blocked,
}

// One stored directory entry
struct DirectoryUser {
    uid: String,
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    password_hash: String,
    salt: String,
    email_verified: bool,
    last_sign_in: DateTime<Utc>,
}

/// In-memory identity provider with salted password verification.
///
/// Stands in for the managed auth backend; the federated popup outcome
/// is configurable so tests can exercise every error code.
pub struct DirectoryProvider {
    users: DashMap<String, DirectoryUser>, // email -> user
    federated: Mutex<FederatedOutcome>,
}

impl DirectoryProvider {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            federated: Mutex::new(FederatedOutcome::Success {
                email: "federated.user@gmail.com".to_string(),
                name: "Federated User".to_string(),
            }),
        }
    }

    /// Override what the next federated popup resolves to
    pub fn set_federated_outcome(&self, outcome: FederatedOutcome) {
        *self.federated.lock().unwrap() = outcome;
    }

    /// Generate a random salt for password hashing
    fn generate_salt(&self) -> String {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill(&mut salt);
        general_purpose::STANDARD.encode(salt)
    }

    /// Hash a password with the given salt
    fn hash_password(&self, password: &str, salt: &str) -> String {
        let salted = format!("{}{}", password, salt);
        let mut hasher = Sha256::new();
        hasher.update(salted.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify a password against a stored hash and salt
    fn verify_password(&self, password: &str, hash: &str, salt: &str) -> bool {
        self.hash_password(password, salt) == hash
    }

    fn identity_of(user: &DirectoryUser) -> Identity {
        Identity {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            email_verified: user.email_verified,
            last_sign_in: user.last_sign_in,
        }
    }
}

impl Default for DirectoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for DirectoryProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let mut user = self.users.get_mut(email).ok_or_else(|| {
            AuthError::new(AuthCode::UserNotFound, format!("auth/user-not-found: {}", email))
        })?;

        if !self.verify_password(password, &user.password_hash, &user.salt) {
            return Err(AuthError::new(
                AuthCode::WrongPassword,
                "auth/wrong-password",
            ));
        }

        user.last_sign_in = Utc::now();
        debug!("Directory sign-in for {}", email);
        Ok(Self::identity_of(&user))
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Identity> {
        if !email.contains('@') {
            return Err(AuthError::new(AuthCode::InvalidEmail, "auth/invalid-email"));
        }
        if self.users.contains_key(email) {
            return Err(AuthError::new(
                AuthCode::EmailAlreadyInUse,
                "auth/email-already-in-use",
            ));
        }

        let salt = self.generate_salt();
        let password_hash = self.hash_password(password, &salt);
        let user = DirectoryUser {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: Some(name.to_string()),
            photo_url: None,
            password_hash,
            salt,
            email_verified: false,
            last_sign_in: Utc::now(),
        };
        let identity = Self::identity_of(&user);
        self.users.insert(email.to_string(), user);
        debug!("Directory sign-up for {}", email);
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> Result<Identity> {
        let outcome = self.federated.lock().unwrap().clone();
        match outcome {
            FederatedOutcome::Success { email, name } => {
                // Federated accounts are provisioned on first login and
                // arrive verified, with a provider-hosted photo.
                let mut entry = self.users.entry(email.clone()).or_insert_with(|| {
                    let salt = self.generate_salt();
                    DirectoryUser {
                        uid: Uuid::new_v4().to_string(),
                        email: email.clone(),
                        display_name: Some(name.clone()),
                        photo_url: Some(format!(
                            "https://lh3.example.com/a/{}",
                            &Uuid::new_v4().to_string()[..8]
                        )),
                        password_hash: String::new(),
                        salt,
                        email_verified: true,
                        last_sign_in: Utc::now(),
                    }
                });
                entry.last_sign_in = Utc::now();
                Ok(Self::identity_of(&entry))
            }
            FederatedOutcome::ClosedByUser => Err(AuthError::new(
                AuthCode::PopupClosedByUser,
                "auth/popup-closed-by-user",
            )),
            FederatedOutcome::Blocked => {
                Err(AuthError::new(AuthCode::PopupBlocked, "auth/popup-blocked"))
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let provider = DirectoryProvider::new();
        let created = provider
            .sign_up("Ada", "ada@example.com", "hunter22")
            .await
            .unwrap();
        let signed_in = provider
            .sign_in("ada@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(created.uid, signed_in.uid);
        assert_eq!(signed_in.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_codes() {
        let provider = DirectoryProvider::new();
        provider
            .sign_up("Ada", "ada@example.com", "hunter22")
            .await
            .unwrap();

        let err = provider
            .sign_in("ada@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.code, AuthCode::WrongPassword);

        let err = provider.sign_in("ghost@example.com", "x").await.unwrap_err();
        assert_eq!(err.code, AuthCode::UserNotFound);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = DirectoryProvider::new();
        provider
            .sign_up("Ada", "ada@example.com", "hunter22")
            .await
            .unwrap();
        let err = provider
            .sign_up("Eve", "ada@example.com", "hunter23")
            .await
            .unwrap_err();
        assert_eq!(err.code, AuthCode::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn federated_outcomes() {
        let provider = DirectoryProvider::new();
        let identity = provider.sign_in_federated().await.unwrap();
        assert!(identity.email_verified);
        assert!(identity.photo_url.is_some());

        provider.set_federated_outcome(FederatedOutcome::ClosedByUser);
        let err = provider.sign_in_federated().await.unwrap_err();
        assert_eq!(err.code, AuthCode::PopupClosedByUser);

        provider.set_federated_outcome(FederatedOutcome::Blocked);
        let err = provider.sign_in_federated().await.unwrap_err();
        assert_eq!(err.code, AuthCode::PopupBlocked);
    }
}
