/// Credential authentication against the user store
///
/// [`CredentialAuthenticator`] turns submitted [`Credentials`] into a
/// [`Principal`]. It distinguishes "no such user" from "wrong password"
/// internally so the audit trail can tell them apart; callers are expected
/// to present both identically to clients.
///
/// # Timing
///
/// When the username is unknown, the submitted password is still verified
/// against a dummy hash so that the response time does not reveal whether the
/// account exists.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tokengate_shared::auth::authenticator::CredentialAuthenticator;
/// use tokengate_shared::auth::password::Argon2Hashing;
/// use tokengate_shared::auth::principal::Credentials;
/// use tokengate_shared::models::user::InMemoryUserStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let authenticator = CredentialAuthenticator::new(
///     Arc::new(InMemoryUserStore::default()),
///     Arc::new(Argon2Hashing::default()),
/// )?;
///
/// let principal = authenticator
///     .authenticate(&Credentials::new("alice", "password"))
///     .await?;
/// println!("authenticated {}", principal.username());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use super::password::{PasswordError, PasswordHashing};
use super::principal::{Credentials, Principal};
use crate::models::user::{UserStore, UserStoreError};

/// Plaintext hashed once at construction to produce the dummy hash
const DUMMY_PASSWORD: &str = "userNotFoundPassword";

/// Error type for credential authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// No account with the submitted username
    #[error("User with {0} wasn't found")]
    UserNotFound(String),

    /// Account exists but the password does not match
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// User store or hashing backend failed
    #[error("Authentication backend failure: {0}")]
    Backend(String),
}

impl From<UserStoreError> for AuthenticationError {
    fn from(err: UserStoreError) -> Self {
        AuthenticationError::Backend(err.to_string())
    }
}

/// Validates usernames and passwords against a [`UserStore`]
#[derive(Clone)]
pub struct CredentialAuthenticator {
    users: Arc<dyn UserStore>,
    hashing: Arc<dyn PasswordHashing>,
    dummy_hash: Arc<str>,
}

impl CredentialAuthenticator {
    /// Creates an authenticator
    ///
    /// # Errors
    ///
    /// Returns `PasswordError` if the dummy hash cannot be produced.
    pub fn new(
        users: Arc<dyn UserStore>,
        hashing: Arc<dyn PasswordHashing>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hashing.hash(DUMMY_PASSWORD)?.into();

        Ok(Self {
            users,
            hashing,
            dummy_hash,
        })
    }

    /// Authenticates credentials and returns the matching principal
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the username is unknown
    /// - `BadCredentials` if the password does not match, or the stored hash
    ///   is unreadable
    /// - `Backend` if the user store or the hashing task fails
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Principal, AuthenticationError> {
        let user = self.users.get_user(&credentials.username).await?;

        let Some(user) = user else {
            // Burn the same verification cost as a real account would.
            let _ = self
                .verify(credentials.password.clone(), self.dummy_hash.to_string())
                .await;
            return Err(AuthenticationError::UserNotFound(
                credentials.username.clone(),
            ));
        };

        match self
            .verify(credentials.password.clone(), user.password_hash.clone())
            .await?
        {
            Ok(true) => {
                tracing::debug!(username = %user.username, role = user.role.as_str(), "Credentials verified");
                Ok(user.principal())
            }
            Ok(false) => Err(AuthenticationError::BadCredentials(format!(
                "password mismatch for {}",
                user.username
            ))),
            Err(e) => Err(AuthenticationError::BadCredentials(format!(
                "stored hash for {} is unusable: {}",
                user.username, e
            ))),
        }
    }

    /// Runs password verification on the blocking pool
    async fn verify(
        &self,
        password: String,
        hash: String,
    ) -> Result<Result<bool, PasswordError>, AuthenticationError> {
        let hashing = Arc::clone(&self.hashing);

        tokio::task::spawn_blocking(move || hashing.verify(&password, &hash))
            .await
            .map_err(|e| AuthenticationError::Backend(format!("Password verification task failed: {}", e)))
    }
}
