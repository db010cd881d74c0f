//! Authentication service.
//!
//! Validates username/password pairs against the admin or customer
//! credential namespace. The namespace is chosen by the record type:
//!
//! ```rust,ignore
//! let admin = auth.validate::<AdminAccount>("TechAdmin1", password).await?;
//! let client = auth.validate_customer("client1", password).await?;
//! ```
//!
//! An unknown username and a wrong password fail identically.

mod error;

pub use error::AuthError;

use secrecy::SecretString;
use tokio::sync::mpsc::UnboundedSender;
use tracing::instrument;

use agora_core::{Role, Username};

use crate::db::CredentialStore;
use crate::models::{Account, AdminAccount, CustomerAccount, Identity};
use crate::services::password::{PasswordVerifier, Verification};

/// A request to re-hash a password with the current parameters.
///
/// Emitted after a successful login whose stored hash is outdated. The
/// consumer owns writing the new hash back to the credential store.
#[derive(Debug)]
pub struct RehashRequest {
    /// Account whose hash is outdated.
    pub username: Username,
    /// Namespace the account lives in.
    pub role: Role,
    /// The verified plaintext password.
    pub password: SecretString,
}

/// Authentication service.
///
/// Lookups are read-only, so one instance can serve concurrent logins.
pub struct AuthService<S> {
    store: S,
    verifier: PasswordVerifier,
    rehash_queue: Option<UnboundedSender<RehashRequest>>,
}

impl<S> AuthService<S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: S, verifier: PasswordVerifier) -> Self {
        Self {
            store,
            verifier,
            rehash_queue: None,
        }
    }

    /// Send rehash requests for outdated hashes to `queue`.
    #[must_use]
    pub fn with_rehash_queue(mut self, queue: UnboundedSender<RehashRequest>) -> Self {
        self.rehash_queue = Some(queue);
        self
    }

    /// The underlying credential store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Hash a password for storage in a credential record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.verifier.hash(password).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::PasswordHash
        })
    }

    /// Validate credentials against the namespace of record type `A`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` if either argument is blank, or the
    /// username is too long. The store is not consulted in that case.
    /// Returns `AuthError::InvalidCredentials` if no record matches the
    /// username or the password is wrong.
    /// Returns `AuthError::Repository` if the lookup fails.
    #[instrument(skip(self, password), fields(role = %A::ROLE))]
    pub async fn validate<A>(&self, username: &str, password: &str) -> Result<Identity, AuthError>
    where
        A: Account,
        S: CredentialStore<A>,
    {
        let username = Username::parse(username).map_err(|e| {
            tracing::debug!(error = %e, "Rejected username");
            AuthError::InvalidInput("username")
        })?;
        if password.trim().is_empty() {
            return Err(AuthError::InvalidInput("password"));
        }

        let Some(account) = CredentialStore::<A>::find_account(&self.store, &username).await?
        else {
            tracing::info!("Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        match self.verifier.verify(account.password_hash(), password) {
            Verification::Match => {}
            Verification::MatchNeedsRehash => self.request_rehash(&username, A::ROLE, password),
            Verification::NoMatch => {
                tracing::info!("Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        }

        tracing::info!("Login succeeded");
        Ok(Identity {
            username: account.username().clone(),
            role: A::ROLE,
        })
    }

    /// Validate administrator credentials.
    ///
    /// # Errors
    ///
    /// See [`AuthService::validate`].
    pub async fn validate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError>
    where
        S: CredentialStore<AdminAccount>,
    {
        self.validate::<AdminAccount>(username, password).await
    }

    /// Validate customer credentials.
    ///
    /// # Errors
    ///
    /// See [`AuthService::validate`].
    pub async fn validate_customer(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError>
    where
        S: CredentialStore<CustomerAccount>,
    {
        self.validate::<CustomerAccount>(username, password).await
    }

    /// Queue a hash upgrade without waiting for it.
    fn request_rehash(&self, username: &Username, role: Role, password: &str) {
        let Some(queue) = &self.rehash_queue else {
            tracing::debug!("Stored hash is outdated; no rehash queue configured");
            return;
        };

        let request = RehashRequest {
            username: username.clone(),
            role,
            password: SecretString::from(password.to_owned()),
        };
        if queue.send(request).is_err() {
            tracing::debug!("Rehash queue closed; skipping hash upgrade");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agora_core::{AdminId, CustomerId};
    use tokio::sync::mpsc;

    use super::*;
    use crate::db::memory::MemoryCredentialStore;

    fn fast() -> PasswordVerifier {
        PasswordVerifier::with_cost(8, 1, 1).unwrap()
    }

    fn service_with_customer(password: &str) -> AuthService<MemoryCredentialStore> {
        let verifier = fast();
        let store = MemoryCredentialStore::new();
        store.insert_customer(CustomerAccount::new(
            CustomerId::new(1),
            Username::parse("client1").unwrap(),
            verifier.hash(password).unwrap(),
        ));
        AuthService::new(store, verifier)
    }

    #[tokio::test]
    async fn test_customer_login() {
        let auth = service_with_customer("Secret#1");

        let identity = auth.validate_customer("client1", "Secret#1").await.unwrap();

        assert_eq!(identity.username.as_str(), "client1");
        assert_eq!(identity.role, Role::Client);
    }

    #[tokio::test]
    async fn test_blank_input_skips_store() {
        let auth = service_with_customer("Secret#1");

        let err = auth.validate_customer("", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput("username")));
        let err = auth.validate_customer("client1", "   ").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput("password")));

        assert_eq!(auth.store().lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_overlong_username_is_invalid_input() {
        let auth = service_with_customer("Secret#1");
        let long = "u".repeat(65);

        let err = auth.validate_customer(&long, "Secret#1").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidInput(_)));
        assert_eq!(auth.store().lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_matches_wrong_password() {
        let auth = service_with_customer("Secret#1");

        let unknown = auth.validate_customer("nobody", "Secret#1").await.unwrap_err();
        let wrong = auth.validate_customer("client1", "Secret#2").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_namespaces_are_separate() {
        let verifier = fast();
        let store = MemoryCredentialStore::new();
        store.insert_admin(AdminAccount::new(
            AdminId::new(1),
            Username::parse("TechAdmin1").unwrap(),
            verifier.hash("Admin#1").unwrap(),
        ));
        let auth = AuthService::new(store, verifier);

        let identity = auth.validate_admin("TechAdmin1", "Admin#1").await.unwrap();
        assert!(identity.is_admin());

        let err = auth
            .validate_customer("TechAdmin1", "Admin#1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_store_failure_is_repository_error() {
        let auth = service_with_customer("Secret#1");
        auth.store().set_unavailable(true);

        let err = auth.validate_customer("client1", "Secret#1").await.unwrap_err();

        assert!(matches!(err, AuthError::Repository(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_outdated_hash_logs_in_and_queues_rehash() {
        let old = PasswordVerifier::with_cost(16, 1, 1).unwrap();
        let store = MemoryCredentialStore::new();
        store.insert_customer(CustomerAccount::new(
            CustomerId::new(7),
            Username::parse("client1").unwrap(),
            old.hash("Secret#1").unwrap(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let auth = AuthService::new(store, fast()).with_rehash_queue(tx);

        let identity = auth.validate_customer("client1", "Secret#1").await.unwrap();
        assert!(identity.is_client());

        let request = rx.try_recv().unwrap();
        assert_eq!(request.username.as_str(), "client1");
        assert_eq!(request.role, Role::Client);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_rehash_queue_is_ignored() {
        let old = PasswordVerifier::with_cost(16, 1, 1).unwrap();
        let store = MemoryCredentialStore::new();
        store.insert_customer(CustomerAccount::new(
            CustomerId::new(7),
            Username::parse("client1").unwrap(),
            old.hash("Secret#1").unwrap(),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let auth = AuthService::new(store, fast()).with_rehash_queue(tx);

        assert!(auth.validate_customer("client1", "Secret#1").await.is_ok());
    }

    #[test]
    fn test_hash_password_verifies() {
        let auth = AuthService::new(MemoryCredentialStore::new(), fast());
        let hash = auth.hash_password("Secret#1").unwrap();
        assert_eq!(fast().verify(&hash, "Secret#1"), Verification::Match);
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AuthError::InvalidInput("username").is_client_error());
        assert!(AuthError::InvalidCredentials.is_client_error());
        assert!(!AuthError::PasswordHash.is_client_error());
    }
}
