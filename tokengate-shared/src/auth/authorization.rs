/// Authority checks for handlers downstream of the gate
///
/// The gate attaches a [`Principal`] to each authenticated request; handlers
/// call these helpers to require specific authorities. The error never names
/// more than the missing authority, and callers are expected to keep even
/// that out of client responses.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::authorization::{require_authority, require_any_authority};
/// use tokengate_shared::auth::principal::Principal;
///
/// let principal = Principal::new("alice", ["ROLE_USER"]);
/// assert!(require_authority(&principal, "ROLE_USER").is_ok());
/// assert!(require_authority(&principal, "user:write").is_err());
/// assert!(require_any_authority(&principal, &["ROLE_ADMIN", "ROLE_USER"]).is_ok());
/// ```

use super::principal::Principal;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Principal lacks a required authority
    #[error("{username} lacks required authority {authority}")]
    MissingAuthority { username: String, authority: String },

    /// Principal holds none of the accepted authorities
    #[error("{username} holds none of [{accepted}]")]
    NoneOf { username: String, accepted: String },
}

/// Requires the principal to hold `authority`
pub fn require_authority(principal: &Principal, authority: &str) -> Result<(), AuthzError> {
    if principal.has_authority(authority) {
        Ok(())
    } else {
        Err(AuthzError::MissingAuthority {
            username: principal.username().to_string(),
            authority: authority.to_string(),
        })
    }
}

/// Requires the principal to hold at least one of `authorities`
pub fn require_any_authority(principal: &Principal, authorities: &[&str]) -> Result<(), AuthzError> {
    if authorities.iter().any(|a| principal.has_authority(a)) {
        Ok(())
    } else {
        Err(AuthzError::NoneOf {
            username: principal.username().to_string(),
            accepted: authorities.join(","),
        })
    }
}
