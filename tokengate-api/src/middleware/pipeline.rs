/// Security pipeline
///
/// Sits inside the failure translator. A `POST` to the login path is
/// answered here by the login stage and never reaches a handler. Every other
/// request goes through the verification stage; on success the
/// [`Principal`](tokengate_shared::auth::principal::Principal) is inserted
/// into the request extensions for handlers to extract.
///
/// Failures are returned, not rendered. The translator does the rest.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::translator::AuditIdentity;
use crate::{app::AppState, error::Failure};

/// Pipeline layer
///
/// Wrap with `axum::middleware::from_fn_with_state` inside the translator.
pub async fn security_pipeline(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Failure> {
    let identity = req
        .extensions()
        .get::<AuditIdentity>()
        .cloned()
        .unwrap_or_default();

    if state.login.matches(req.method(), req.uri().path()) {
        let limit = state.config.security.max_login_body_bytes;
        let body = axum::body::to_bytes(req.into_body(), limit)
            .await
            .map_err(|e| Failure::MalformedRequest(format!("Login body could not be read: {}", e)))?;

        let issued = state.login.attempt(&body, &identity).await?;
        return Ok(issued.into_response());
    }

    if let Some(principal) = state.verification.verify(req.uri().path(), req.headers())? {
        tracing::debug!(username = %principal.username(), "Request authenticated");
        identity.record(principal.username());
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}
