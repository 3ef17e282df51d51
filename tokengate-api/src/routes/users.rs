/// Account lookups behind the gate
///
/// # Endpoints
///
/// - `GET /api/users/me` - The authenticated principal
/// - `GET /api/users/:username` - Any account (requires `user:read`)
///
/// Both rely on the verification stage having attached a [`Principal`].
/// Extractor rejections are returned as failures so they go through the
/// translator like any other.

use crate::{
    app::AppState,
    error::{ApiResult, Failure},
};
use axum::{
    extract::{
        rejection::{ExtensionRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tokengate_shared::{
    auth::{
        authorization::{require_any_authority, require_authority},
        principal::Principal,
    },
    models::user::Role,
};

/// Authority needed to look up other accounts
pub const USER_READ: &str = "user:read";

/// Current principal
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalResponse {
    pub username: String,
    pub authorities: Vec<String>,
}

/// Account details
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub role: Role,
    pub authorities: Vec<String>,
}

/// Returns the authenticated principal, as decoded from its token
///
/// # Errors
///
/// - `403 Forbidden`: Token carries neither `ROLE_USER` nor `ROLE_ADMIN`
pub async fn me(
    principal: Result<Extension<Principal>, ExtensionRejection>,
) -> ApiResult<Json<PrincipalResponse>> {
    let Extension(principal) = principal?;
    require_any_authority(&principal, &["ROLE_USER", "ROLE_ADMIN"])?;

    Ok(Json(PrincipalResponse {
        username: principal.username().to_string(),
        authorities: principal.authorities().iter().cloned().collect(),
    }))
}

/// Looks up an account by username
///
/// # Errors
///
/// - `400 Bad Request`: Username segment is not valid UTF-8
/// - `403 Forbidden`: Principal lacks `user:read`
/// - `404 Not Found`: No such account
pub async fn get_user(
    State(state): State<AppState>,
    principal: Result<Extension<Principal>, ExtensionRejection>,
    username: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Extension(principal) = principal?;
    let Path(username) = username?;
    require_authority(&principal, USER_READ)?;

    let user = state
        .users
        .get_user(&username)
        .await?
        .ok_or_else(|| Failure::UserNotFound(format!("User with {} wasn't found", username)))?;

    Ok(Json(UserResponse {
        authorities: user.role.granted_authorities().into_iter().collect(),
        username: user.username,
        role: user.role,
    }))
}
