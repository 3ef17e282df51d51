/// Verification stage
///
/// Runs on every request that is not a login attempt. Requests to exempt
/// paths pass through unauthenticated without the token codec being
/// consulted. Everything else must carry a valid token; the principal it
/// encodes is handed back for the pipeline to attach to the request.
///
/// ```text
/// Unauthenticated --(exempt path)--------------> pass through, no Principal
/// Unauthenticated --(valid token)--------------> Authenticated(Principal)
/// Unauthenticated --(absent/invalid token)-----> Rejected(Failure)
/// ```
///
/// The stage never mutates or re-issues tokens.

use std::sync::Arc;
use tokengate_shared::auth::{jwt::TokenCodec, principal::Principal};

use super::TokenHeader;
use crate::error::Failure;

/// Allow-list of paths that bypass verification
///
/// An entry is either an exact path or a prefix pattern `/prefix/**`, which
/// matches `/prefix` itself and every path below it.
#[derive(Debug, Clone, Default)]
pub struct ExemptPaths {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl ExemptPaths {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths = Self::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_suffix("/**") {
                Some(prefix) => paths.prefixes.push(prefix.to_string()),
                None => paths.exact.push(pattern.to_string()),
            }
        }

        paths
    }

    /// Whether `path` is on the allow-list
    pub fn matches(&self, path: &str) -> bool {
        self.exact.iter().any(|exact| exact == path)
            || self.prefixes.iter().any(|prefix| {
                path.strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
    }
}

/// Validates tokens on protected paths
#[derive(Debug, Clone)]
pub struct VerificationStage {
    codec: Arc<TokenCodec>,
    header: TokenHeader,
    exempt: ExemptPaths,
}

impl VerificationStage {
    pub fn new(codec: Arc<TokenCodec>, header: TokenHeader, exempt: ExemptPaths) -> Self {
        Self {
            codec,
            header,
            exempt,
        }
    }

    /// Whether `path` bypasses this stage
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt.matches(path)
    }

    /// Verifies the request's token
    ///
    /// Returns `Ok(None)` for exempt paths and `Ok(Some(principal))` for a
    /// valid token.
    ///
    /// # Errors
    ///
    /// - `Failure::MissingToken` if the header is absent or malformed
    /// - `Failure::InvalidToken` if the token fails signature, format or
    ///   expiry checks
    pub fn verify(
        &self,
        path: &str,
        headers: &axum::http::HeaderMap,
    ) -> Result<Option<Principal>, Failure> {
        if self.is_exempt(path) {
            return Ok(None);
        }

        let token = self.header.extract(headers)?;
        let principal = self.codec.parse(token)?;

        Ok(Some(principal))
    }
}
