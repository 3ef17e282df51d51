/// Login stage
///
/// Handles `POST {login_path}`: parses credentials, authenticates them and,
/// on success, answers `200 OK` with the token in the configured header.
///
/// ```text
/// Idle -> Authenticating -> Issued    (200, `{header}: {prefix}{token}`)
///                        -> Rejected  (Failure, handed to the translator)
/// ```
///
/// There are no retries; a failed attempt is final for this request.

use axum::{
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokengate_shared::auth::{
    authenticator::CredentialAuthenticator, jwt::TokenCodec, principal::Credentials,
};

use super::{translator::AuditIdentity, TokenHeader};
use crate::error::Failure;

/// Header produced by a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub header: HeaderName,
    pub value: HeaderValue,
}

impl IntoResponse for IssuedToken {
    fn into_response(self) -> Response {
        let mut response = StatusCode::OK.into_response();
        response.headers_mut().insert(self.header, self.value);
        response
    }
}

/// Exchanges credentials for a token
#[derive(Clone)]
pub struct LoginStage {
    path: String,
    authenticator: CredentialAuthenticator,
    codec: Arc<TokenCodec>,
    header: TokenHeader,
}

impl LoginStage {
    pub fn new(
        path: impl Into<String>,
        authenticator: CredentialAuthenticator,
        codec: Arc<TokenCodec>,
        header: TokenHeader,
    ) -> Self {
        Self {
            path: path.into(),
            authenticator,
            codec,
            header,
        }
    }

    /// Login path this stage answers
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether a request is a login attempt (exact path, POST only)
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        method == Method::POST && path == self.path
    }

    /// Runs one login attempt over a raw request body
    ///
    /// The attempted username is recorded on `identity` as soon as the body
    /// parses, so failed attempts are attributed in the audit log.
    ///
    /// # Errors
    ///
    /// - `Failure::MalformedRequest` if the body is not credentials JSON
    /// - `Failure::UserNotFound` / `Failure::BadCredentials` from authentication
    /// - `Failure::Unclassified` if the backend or token encoding fails
    pub async fn attempt(&self, body: &[u8], identity: &AuditIdentity) -> Result<IssuedToken, Failure> {
        let credentials = Credentials::from_json(body)
            .map_err(|e| Failure::MalformedRequest(format!("Login body is not valid credentials: {}", e)))?;
        identity.record(&credentials.username);

        let principal = self.authenticator.authenticate(&credentials).await?;
        drop(credentials);

        let token = self.codec.issue(&principal)?;
        tracing::info!(username = %principal.username(), "Access token issued");

        Ok(IssuedToken {
            header: self.header.name().clone(),
            value: self.header.value_for(&token)?,
        })
    }
}
