/// Failure taxonomy for the security pipeline and its handlers
///
/// Every stage and handler returns `Result<T, Failure>`. A `Failure` does not
/// render its own response: converting it with `IntoResponse` parks it in the
/// response extensions, and the failure translator layer
/// ([`crate::middleware::translator`]) turns it into the final sanitized
/// response and writes the audit record. That layer is the only place either
/// happens.
///
/// # Example
///
/// ```
/// use tokengate_api::error::{ApiResult, Failure};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(Failure::UserNotFound("User with bob wasn't found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{ExtensionRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokengate_shared::auth::{
    authenticator::AuthenticationError, authorization::AuthzError, jwt::JwtError,
    password::PasswordError,
};
use tokengate_shared::models::user::UserStoreError;

/// API result type alias
pub type ApiResult<T> = Result<T, Failure>;

/// A security or domain failure scoped to one request
///
/// Each variant carries the internal message that goes to the audit log.
/// Clients never see it except for [`Failure::Unclassified`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Body or parameter could not be read into the expected shape
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// No account with the given username
    #[error("{0}")]
    UserNotFound(String),

    /// Password did not match
    #[error("{0}")]
    BadCredentials(String),

    /// Registration collided with an existing account
    #[error("{0}")]
    UsernameAlreadyExists(String),

    /// Token header absent or malformed on a protected path
    #[error("Missing token: {0}")]
    MissingToken(String),

    /// Token failed signature, format or expiry checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated, but not allowed
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Anything else
    #[error("{0}")]
    Unclassified(String),
}

/// Tag identifying a failure in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    MalformedRequestError,
    UserNotFoundError,
    BadCredentialsError,
    UsernameAlreadyExistsError,
    MissingTokenError,
    InvalidTokenError,
    AccessDeniedError,
    UnclassifiedError,
}

impl FailureKind {
    /// Name written to the `failure_kind` audit field
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MalformedRequestError => "MalformedRequestError",
            FailureKind::UserNotFoundError => "UserNotFoundError",
            FailureKind::BadCredentialsError => "BadCredentialsError",
            FailureKind::UsernameAlreadyExistsError => "UsernameAlreadyExistsError",
            FailureKind::MissingTokenError => "MissingTokenError",
            FailureKind::InvalidTokenError => "InvalidTokenError",
            FailureKind::AccessDeniedError => "AccessDeniedError",
            FailureKind::UnclassifiedError => "UnclassifiedError",
        }
    }
}

impl Failure {
    /// Audit tag for this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::MalformedRequest(_) => FailureKind::MalformedRequestError,
            Failure::UserNotFound(_) => FailureKind::UserNotFoundError,
            Failure::BadCredentials(_) => FailureKind::BadCredentialsError,
            Failure::UsernameAlreadyExists(_) => FailureKind::UsernameAlreadyExistsError,
            Failure::MissingToken(_) => FailureKind::MissingTokenError,
            Failure::InvalidToken(_) => FailureKind::InvalidTokenError,
            Failure::AccessDenied(_) => FailureKind::AccessDeniedError,
            Failure::Unclassified(_) => FailureKind::UnclassifiedError,
        }
    }
}

/// Error response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        // Placeholder until the translator layer swaps in the real response.
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<AuthenticationError> for Failure {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::UserNotFound(_) => Failure::UserNotFound(err.to_string()),
            AuthenticationError::BadCredentials(_) => Failure::BadCredentials(err.to_string()),
            AuthenticationError::Backend(_) => Failure::Unclassified(err.to_string()),
        }
    }
}

impl From<JwtError> for Failure {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(_) | JwtError::WeakKey { .. } => {
                Failure::Unclassified(err.to_string())
            }
            JwtError::Expired | JwtError::InvalidSignature | JwtError::InvalidFormat(_) => {
                Failure::InvalidToken(err.to_string())
            }
        }
    }
}

impl From<AuthzError> for Failure {
    fn from(err: AuthzError) -> Self {
        Failure::AccessDenied(err.to_string())
    }
}

impl From<UserStoreError> for Failure {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::UsernameTaken(_) => Failure::UsernameAlreadyExists(err.to_string()),
            UserStoreError::Unavailable(_) => Failure::Unclassified(err.to_string()),
        }
    }
}

impl From<PasswordError> for Failure {
    fn from(err: PasswordError) -> Self {
        Failure::Unclassified(format!("Password operation failed: {}", err))
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        Failure::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Failure {
    fn from(rejection: PathRejection) -> Self {
        Failure::MalformedRequest(rejection.body_text())
    }
}

/// A handler needing a principal was reached without one, e.g. on an exempt path
impl From<ExtensionRejection> for Failure {
    fn from(rejection: ExtensionRejection) -> Self {
        Failure::MissingToken(format!("No authenticated principal: {}", rejection.body_text()))
    }
}
