/// Authenticated identities and the credentials that produce them
///
/// A [`Credentials`] value lives only for the duration of a login request.
/// A [`Principal`] is what the login exchange (and every verified token)
/// yields: a username plus the set of granted authorities. Handlers read the
/// Principal; they never see the raw token.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::principal::Principal;
///
/// let principal = Principal::new("alice", ["ROLE_USER", "user:read"]);
/// assert!(principal.has_authority("user:read"));
/// assert_eq!(principal.authorities_claim(), "ROLE_USER,user:read");
///
/// let restored = Principal::from_claim("alice", "ROLE_USER,user:read");
/// assert_eq!(restored, principal);
/// ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Separator used when authorities travel inside a single token claim
pub const AUTHORITY_SEPARATOR: char = ',';

/// Username/password pair submitted to the login path
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Submitted username
    pub username: String,

    /// Submitted plaintext password
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses credentials from a JSON request body
    ///
    /// The body must be an object with string `username` and `password`
    /// fields. Anything else is rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// An authenticated identity attached to a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    username: String,
    authorities: BTreeSet<String>,
}

impl Principal {
    /// Creates a principal from a username and its granted authorities
    pub fn new<I, S>(username: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    /// Rebuilds a principal from a token subject and its authorities claim
    ///
    /// The claim is split on `,` and empty segments are dropped, so an empty
    /// claim yields an empty authority set. Segments are kept verbatim.
    pub fn from_claim(subject: impl Into<String>, claim: &str) -> Self {
        let authorities = claim
            .split(AUTHORITY_SEPARATOR)
            .filter(|authority| !authority.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            username: subject.into(),
            authorities,
        }
    }

    /// Username of the authenticated identity
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Granted authorities, in sorted order
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    /// Checks whether the principal holds an authority
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Authorities joined into the single-string token claim
    pub fn authorities_claim(&self) -> String {
        self.authorities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}
