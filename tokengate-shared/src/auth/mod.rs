/// Authentication and authorization primitives
///
/// # Modules
///
/// - [`principal`]: Credentials and the authenticated Principal
/// - [`jwt`]: Signing key and token codec
/// - [`password`]: Argon2id password hashing
/// - [`authenticator`]: Credential checks against the user store
/// - [`authorization`]: Authority checks for downstream handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use tokengate_shared::auth::{
///     authenticator::CredentialAuthenticator,
///     jwt::{SigningKey, TokenCodec},
///     password::Argon2Hashing,
///     principal::Credentials,
/// };
/// use tokengate_shared::models::user::InMemoryUserStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let authenticator = CredentialAuthenticator::new(
///     Arc::new(InMemoryUserStore::default()),
///     Arc::new(Argon2Hashing::default()),
/// )?;
/// let codec = TokenCodec::new(
///     SigningKey::from_passphrase("a-passphrase-of-at-least-32-bytes!!")?,
///     Duration::hours(24),
/// );
///
/// let principal = authenticator.authenticate(&Credentials::new("alice", "pw")).await?;
/// let token = codec.issue(&principal)?;
/// assert_eq!(codec.parse(&token)?, principal);
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod authorization;
pub mod jwt;
pub mod password;
pub mod principal;
