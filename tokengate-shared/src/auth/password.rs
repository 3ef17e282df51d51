/// Password hashing using Argon2id
///
/// The gate never compares plaintext passwords itself; it goes through the
/// [`PasswordHashing`] seam so the verification scheme can be swapped. The
/// shipped implementation is [`Argon2Hashing`].
///
/// # Security
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Memory**: 64 MB (65536 KB) by default
/// - **Iterations**: 3 passes by default
/// - **Parallelism**: 4 lanes by default
/// - **Output**: 32-byte hash, PHC string format
///
/// Verification reads the parameters embedded in the stored hash, so hashes
/// produced with other costs still verify.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::password::{Argon2Hashing, PasswordHashing};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hashing = Argon2Hashing::default();
/// let hash = hashing.hash("super_secret_password_123")?;
///
/// assert!(hashing.verify("super_secret_password_123", &hash)?);
/// assert!(!hashing.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Password-verification collaborator
///
/// `verify` returns `Ok(false)` on a plain mismatch and reserves `Err` for
/// hashes it cannot interpret.
pub trait PasswordHashing: Send + Sync {
    /// Hashes a plaintext password into a self-describing string
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Checks a plaintext password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id hashing with configurable cost
#[derive(Debug, Clone)]
pub struct Argon2Hashing {
    params: Params,
}

impl Argon2Hashing {
    /// Creates a hasher with explicit cost parameters
    ///
    /// # Arguments
    ///
    /// * `m_cost` - Memory in KiB
    /// * `t_cost` - Number of passes
    /// * `p_cost` - Parallel lanes
    pub fn with_cost(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, Some(32))
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hashing {
    fn default() -> Self {
        Self {
            // 64 MB, 3 passes, 4 lanes, 32-byte output
            params: Params::new(65536, 3, 4, Some(32)).unwrap_or_default(),
        }
    }
}

impl PasswordHashing for Argon2Hashing {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        // Constant-time comparison; cost parameters come from the hash itself.
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
        }
    }
}

/// Validates password strength for newly registered accounts
///
/// Requires at least 8 characters with an uppercase letter, a lowercase
/// letter, a digit and a special character.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
/// assert!(validate_password_strength("Sh0rt!").is_err());
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    let checks: [(fn(char) -> bool, &str); 4] = [
        (char::is_uppercase, "an uppercase letter"),
        (char::is_lowercase, "a lowercase letter"),
        (char::is_numeric, "a digit"),
        (|c: char| !c.is_alphanumeric(), "a special character"),
    ];

    for (check, requirement) in checks {
        if !password.chars().any(check) {
            return Err(format!("Password must contain at least {}", requirement));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hashing {
        Argon2Hashing::with_cost(1024, 1, 1).expect("Valid parameters")
    }

    #[test]
    fn test_default_hash_parameters() {
        let hash = Argon2Hashing::default().hash("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(Argon2Hashing::with_cost(1, 0, 1).is_err());
    }

    #[test]
    fn test_hash_produces_different_salts() {
        let hashing = cheap();
        let hash1 = hashing.hash("same_password").unwrap();
        let hash2 = hashing.hash("same_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let hashing = cheap();
        let hash = hashing.hash("correct_password").unwrap();

        assert!(hashing.verify("correct_password", &hash).unwrap());
        assert!(!hashing.verify("wrong_password", &hash).unwrap());
        assert!(!hashing.verify("", &hash).unwrap());
    }

    #[test]
    fn test_verify_accepts_hash_from_other_cost() {
        let strong = Argon2Hashing::with_cost(2048, 2, 1).unwrap();
        let hash = strong.hash("portable").unwrap();

        assert!(cheap().verify("portable", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hashing = cheap();

        assert!(matches!(
            hashing.verify("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(hashing.verify("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_unicode_roundtrip() {
        let hashing = cheap();
        let hash = hashing.hash("unicode-密码-パスワード").unwrap();

        assert!(hashing.verify("unicode-密码-パスワード", &hash).unwrap());
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password_strength("MyP@ssw0rd!").is_ok());
        assert!(validate_password_strength("S3cur3$Password").is_ok());

        let cases = [
            ("Sh0rt!", "at least 8 characters"),
            ("lowercase1!", "uppercase letter"),
            ("UPPERCASE1!", "lowercase letter"),
            ("NoDigits!", "digit"),
            ("NoSpecial123", "special character"),
        ];

        for (password, expected) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert!(err.contains(expected), "{}: {}", password, err);
        }
    }
}
