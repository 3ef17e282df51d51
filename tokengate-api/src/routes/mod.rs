/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Account registration
/// - `users`: Account lookups for authenticated principals
///
/// Login has no handler; the login stage answers it inside the pipeline.

pub mod auth;
pub mod health;
pub mod users;

use axum::{http::StatusCode, Json};

use crate::error::ErrorResponse;

/// Fallback for paths no route matches
///
/// Only reached once the request has passed verification, so unknown paths
/// without a token are still rejected as unauthorized.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("not_found", "Not Found")),
    )
}
