/// Token codec: issues and parses signed access tokens
///
/// Tokens are compact JWTs signed with an HMAC key derived from the
/// configured passphrase. They carry the principal's username as the subject
/// and its authorities as a single comma-joined claim.
///
/// # Security
///
/// - **Algorithm**: HS256, HS384 or HS512, chosen from the key length
/// - **Key**: passphrase bytes used directly, at least 32 bytes (256 bits)
/// - **Expiration**: configurable lifetime, validated with zero leeway
/// - **Stateless**: nothing is stored server-side; tokens cannot be revoked
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tokengate_shared::auth::jwt::{SigningKey, TokenCodec};
/// use tokengate_shared::auth::principal::Principal;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let key = SigningKey::from_passphrase("a-passphrase-of-at-least-32-bytes!!")?;
/// let codec = TokenCodec::new(key, Duration::hours(24));
///
/// let principal = Principal::new("alice", ["ROLE_USER"]);
/// let token = codec.issue(&principal)?;
///
/// let parsed = codec.parse(&token)?;
/// assert_eq!(parsed, principal);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::principal::Principal;

/// Shortest passphrase accepted as an HMAC key
pub const MIN_KEY_BYTES: usize = 32;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Passphrase too short to be used as a signing key
    #[error("Signing key must be at least {} bytes, got {length}", MIN_KEY_BYTES)]
    WeakKey { length: usize },

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature does not verify under the current key
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token could not be decoded
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),
}

/// Process-wide HMAC signing key
///
/// Built once at startup and shared read-only by the codec.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Derives the signing key from a passphrase
    ///
    /// The passphrase bytes are the key. Its length picks the HMAC strength:
    /// 64 bytes or more selects HS512, 48 or more HS384, otherwise HS256.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::WeakKey` if the passphrase is shorter than
    /// [`MIN_KEY_BYTES`].
    pub fn from_passphrase(passphrase: &str) -> Result<Self, JwtError> {
        let secret = passphrase.as_bytes();
        let algorithm = match secret.len() {
            len if len >= 64 => Algorithm::HS512,
            len if len >= 48 => Algorithm::HS384,
            len if len >= MIN_KEY_BYTES => Algorithm::HS256,
            length => return Err(JwtError::WeakKey { length }),
        };

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// HMAC algorithm tokens are signed and verified with
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (username)
/// - `authorities`: Granted authorities joined by `,`
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// Comma-joined authorities (custom claim)
    pub authorities: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a principal, issued now and expiring after `lifetime`
    ///
    /// A negative lifetime produces claims that are already expired.
    pub fn with_expiration(principal: &Principal, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: principal.username().to_string(),
            authorities: principal.authorities_claim(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Rebuilds the principal the claims were issued for
    pub fn principal(&self) -> Principal {
        Principal::from_claim(self.sub.clone(), &self.authorities)
    }
}

/// Issues and parses tokens with a fixed key and lifetime
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    lifetime: Duration,
}

impl TokenCodec {
    /// Creates a codec that signs with `key` and issues tokens valid for `lifetime`
    pub fn new(key: SigningKey, lifetime: Duration) -> Self {
        Self { key, lifetime }
    }

    /// Lifetime of issued tokens
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for an authenticated principal
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if the encoder fails, which does not
    /// happen for well-formed principals.
    pub fn issue(&self, principal: &Principal) -> Result<String, JwtError> {
        self.encode(&Claims::with_expiration(principal, self.lifetime))
    }

    /// Parses a token back into the principal it was issued for
    ///
    /// # Errors
    ///
    /// Fails if the signature does not verify, the token is malformed, or it
    /// has expired.
    pub fn parse(&self, token: &str) -> Result<Principal, JwtError> {
        self.decode(token).map(|claims| claims.principal())
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(self.key.algorithm), claims, &self.key.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its raw claims
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.key.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.key.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidFormat(e.to_string()),
            }
        })?;

        // The decoder only rejects `exp < now`; a token is dead from `exp` on.
        if token_data.claims.is_expired() {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}
