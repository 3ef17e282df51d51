/// Account registration
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create a `user` account
///
/// Registration is exempt from token verification. It does not log the new
/// user in; clients call the login path afterwards.

use crate::{
    app::AppState,
    error::{ApiResult, Failure},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokengate_shared::{
    auth::password::validate_password_strength,
    models::user::{NewUser, Role},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Username of the new account
    pub username: String,

    /// Role granted
    pub role: Role,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "username": "alice",
///   "role": "user"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body unreadable or validation failed
/// - `409 Conflict`: Username already exists
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;

    req.validate().map_err(|e| {
        let details: Vec<String> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect();
        Failure::MalformedRequest(details.join("; "))
    })?;

    validate_password_strength(&req.password)
        .map_err(|e| Failure::MalformedRequest(format!("password: {}", e)))?;

    // Argon2 blocks the thread for the whole hash.
    let hashing = Arc::clone(&state.hashing);
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hashing.hash(&password))
        .await
        .map_err(|e| Failure::Unclassified(format!("Password hashing task failed: {}", e)))??;

    let user = state
        .users
        .create_user(NewUser {
            username: req.username,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!(username = %user.username, role = user.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: user.username,
            role: user.role,
        }),
    ))
}
