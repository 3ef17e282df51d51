/// Failure translator
///
/// The outermost security layer. It hands every request an [`AuditIdentity`]
/// slot, lets the request run, and if the response carries a parked
/// [`Failure`] it:
///
/// 1. writes one structured audit record with the internal message, and
/// 2. replaces the response with the sanitized status and body.
///
/// No other layer logs security failures or renders failure bodies.
///
/// # Mapping (first match wins)
///
/// | Failure | Status | Message |
/// |---|---|---|
/// | UserNotFound on the login path, hidden | 401 | `Bad credentials` |
/// | UserNotFound | 404 | `User not found` |
/// | UsernameAlreadyExists | 409 | `Username already exists` |
/// | AccessDenied | 403 | `Access is denied` |
/// | MalformedRequest | 400 | `Bad Request` |
/// | BadCredentials | 401 | `Bad credentials` |
/// | MissingToken / InvalidToken | 401 | `Unauthorized` |
/// | Unclassified | 500 | the failure message |

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use crate::app::AppState;
use crate::error::{ErrorResponse, Failure, FailureKind};

/// Username used in audit records when nobody is identified
pub const ANONYMOUS: &str = "anonymous";

/// Audit log target
pub const AUDIT_TARGET: &str = "tokengate::audit";

/// Per-request slot naming who the request acts as, for audit purposes
///
/// Filled by the login stage (attempted username) or the verification stage
/// (authenticated principal). The first recorded name sticks.
#[derive(Debug, Clone, Default)]
pub struct AuditIdentity(Arc<OnceLock<String>>);

impl AuditIdentity {
    pub fn record(&self, username: &str) {
        let _ = self.0.set(username.to_string());
    }

    pub fn username(&self) -> &str {
        self.0.get().map(String::as_str).unwrap_or(ANONYMOUS)
    }
}

/// How failures are presented to clients
#[derive(Debug, Clone)]
pub struct TranslationPolicy {
    /// Login path, where user-existence must not leak
    pub login_path: String,

    /// Fold unknown-user logins into the bad-credentials response
    pub hide_user_not_found: bool,
}

impl TranslationPolicy {
    /// Status and sanitized body for a failure on `path`
    pub fn translate(&self, failure: &Failure, path: &str) -> (StatusCode, ErrorResponse) {
        let on_login_path = path == self.login_path;

        match failure {
            Failure::UserNotFound(_) if on_login_path && self.hide_user_not_found => bad_credentials(),
            Failure::UserNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", "User not found"),
            ),
            Failure::UsernameAlreadyExists(_) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("conflict", "Username already exists"),
            ),
            Failure::AccessDenied(_) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("forbidden", "Access is denied"),
            ),
            Failure::MalformedRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "bad_request",
                    StatusCode::BAD_REQUEST.canonical_reason().unwrap_or("Bad Request"),
                ),
            ),
            Failure::BadCredentials(_) => bad_credentials(),
            Failure::MissingToken(_) | Failure::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("unauthorized", "Unauthorized"),
            ),
            Failure::Unclassified(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("internal_error", message.clone()),
            ),
        }
    }
}

fn bad_credentials() -> (StatusCode, ErrorResponse) {
    (
        StatusCode::UNAUTHORIZED,
        ErrorResponse::new("unauthorized", "Bad credentials"),
    )
}

/// One security failure, as written to the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub username: String,
    pub client_ip: String,
    pub timestamp_millis: i64,
    pub failure_kind: FailureKind,
    pub message: String,
    pub request_path: String,
}

impl AuditRecord {
    pub fn capture(failure: &Failure, identity: &AuditIdentity, client_ip: &str, path: &str) -> Self {
        Self {
            username: identity.username().to_string(),
            client_ip: client_ip.to_string(),
            timestamp_millis: Utc::now().timestamp_millis(),
            failure_kind: failure.kind(),
            message: failure.to_string(),
            request_path: path.to_string(),
        }
    }

    /// Writes the record under the audit target
    pub fn emit(&self) {
        macro_rules! audit {
            ($level:ident) => {
                tracing::$level!(
                    target: AUDIT_TARGET,
                    username = %self.username,
                    client_ip = %self.client_ip,
                    timestamp_millis = self.timestamp_millis,
                    failure_kind = self.failure_kind.as_str(),
                    message = %self.message,
                    request_path = %self.request_path,
                    "Security failure"
                )
            };
        }

        match self.failure_kind {
            FailureKind::UnclassifiedError => audit!(error),
            _ => audit!(warn),
        }
    }
}

/// Peer address of the connection, when the server exposes it
fn client_ip(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Translator layer
///
/// Wrap with `axum::middleware::from_fn_with_state` outside the pipeline.
pub async fn translate_failures(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = AuditIdentity::default();
    req.extensions_mut().insert(identity.clone());

    let path = req.uri().path().to_string();
    let client_ip = client_ip(&req);

    let mut response = next.run(req).await;

    let Some(failure) = response.extensions_mut().remove::<Failure>() else {
        return response;
    };

    AuditRecord::capture(&failure, &identity, &client_ip, &path).emit();

    let (status, body) = state.translation.translate(&failure, &path);
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(hide_user_not_found: bool) -> TranslationPolicy {
        TranslationPolicy {
            login_path: "/api/login".to_string(),
            hide_user_not_found,
        }
    }

    #[test]
    fn test_identity_defaults_to_anonymous() {
        let identity = AuditIdentity::default();
        assert_eq!(identity.username(), ANONYMOUS);

        identity.record("alice");
        identity.record("mallory");
        assert_eq!(identity.username(), "alice");
    }

    #[test]
    fn test_identity_shared_between_clones() {
        let identity = AuditIdentity::default();
        identity.clone().record("alice");
        assert_eq!(identity.username(), "alice");
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let policy = policy(true);
        let not_found = Failure::UserNotFound("User with mallory wasn't found".to_string());
        let bad_password = Failure::BadCredentials("password mismatch for alice".to_string());

        assert_eq!(
            policy.translate(&not_found, "/api/login"),
            policy.translate(&bad_password, "/api/login"),
        );

        let identity = AuditIdentity::default();
        let a = AuditRecord::capture(&not_found, &identity, "127.0.0.1", "/api/login");
        let b = AuditRecord::capture(&bad_password, &identity, "127.0.0.1", "/api/login");
        assert_eq!(a.failure_kind, FailureKind::UserNotFoundError);
        assert_eq!(b.failure_kind, FailureKind::BadCredentialsError);
    }

    #[test]
    fn test_unknown_user_revealed_when_not_hidden() {
        let (status, body) = policy(false).translate(
            &Failure::UserNotFound("User with mallory wasn't found".to_string()),
            "/api/login",
        );

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "User not found");
    }

    #[test]
    fn test_user_not_found_outside_login() {
        let (status, body) = policy(true).translate(
            &Failure::UserNotFound("User with bob wasn't found".to_string()),
            "/api/users/bob",
        );

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.message.contains("bob"));
    }

    #[test]
    fn test_token_failures_share_one_body() {
        let policy = policy(true);
        let expired = policy.translate(&Failure::InvalidToken("Token has expired".to_string()), "/x");
        let forged = policy.translate(&Failure::InvalidToken("Token signature is invalid".to_string()), "/x");
        let absent = policy.translate(&Failure::MissingToken("absent".to_string()), "/x");

        assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
        assert_eq!(expired, forged);
        assert_eq!(expired, absent);
        assert_eq!(expired.1.message, "Unauthorized");
    }

    #[test]
    fn test_sanitized_bodies() {
        let policy = policy(true);
        let cases = [
            (Failure::UsernameAlreadyExists("Username alice already exists".to_string()), StatusCode::CONFLICT, "Username already exists"),
            (Failure::AccessDenied("alice lacks required authority user:read".to_string()), StatusCode::FORBIDDEN, "Access is denied"),
            (Failure::MalformedRequest("expected value at line 1 column 1".to_string()), StatusCode::BAD_REQUEST, "Bad Request"),
            (Failure::Unclassified("Token encoding failed".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "Token encoding failed"),
        ];

        for (failure, status, message) in cases {
            let (actual_status, body) = policy.translate(&failure, "/api/anything");
            assert_eq!(actual_status, status, "{:?}", failure);
            assert_eq!(body.message, message, "{:?}", failure);
        }
    }

    #[test]
    fn test_audit_record_keeps_internal_detail() {
        let identity = AuditIdentity::default();
        identity.record("alice");

        let record = AuditRecord::capture(
            &Failure::InvalidToken("Token has expired".to_string()),
            &identity,
            "10.0.0.7",
            "/api/users/me",
        );

        assert_eq!(record.username, "alice");
        assert_eq!(record.client_ip, "10.0.0.7");
        assert_eq!(record.failure_kind, FailureKind::InvalidTokenError);
        assert_eq!(record.message, "Invalid token: Token has expired");
        assert_eq!(record.request_path, "/api/users/me");
        assert!(record.timestamp_millis > 0);
    }
}
