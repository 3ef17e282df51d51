/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and the security
/// pipeline.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tokengate_api::{app::AppState, config::Config};
/// use tokengate_shared::auth::password::Argon2Hashing;
/// use tokengate_shared::models::user::InMemoryUserStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let state = AppState::new(
///     config,
///     Arc::new(InMemoryUserStore::default()),
///     Arc::new(Argon2Hashing::default()),
/// )?;
/// let app = tokengate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        login::LoginStage,
        pipeline::security_pipeline,
        translator::{translate_failures, TranslationPolicy},
        verification::{ExemptPaths, VerificationStage},
        TokenHeader,
    },
};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tokengate_shared::auth::{
    authenticator::CredentialAuthenticator,
    jwt::{SigningKey, TokenCodec},
    password::PasswordHashing,
};
use tokengate_shared::models::user::UserStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// User lookup and registration
    pub users: Arc<dyn UserStore>,

    /// Password hashing for registration
    pub hashing: Arc<dyn PasswordHashing>,

    /// Login stage
    pub login: Arc<LoginStage>,

    /// Verification stage
    pub verification: Arc<VerificationStage>,

    /// Failure-to-response mapping
    pub translation: Arc<TranslationPolicy>,
}

impl AppState {
    /// Wires the security stages from configuration and collaborators
    ///
    /// # Errors
    ///
    /// Returns an error if the passphrase is too short to be a signing key,
    /// the token header is invalid, or the dummy password hash cannot be
    /// computed.
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        hashing: Arc<dyn PasswordHashing>,
    ) -> anyhow::Result<Self> {
        let key = SigningKey::from_passphrase(&config.jwt.passphrase)?;
        let codec = Arc::new(TokenCodec::new(
            key,
            Duration::hours(i64::from(config.jwt.token_expiration_hours)),
        ));
        let header = TokenHeader::from_properties(&config.jwt)?;
        let authenticator = CredentialAuthenticator::new(Arc::clone(&users), Arc::clone(&hashing))?;

        let login = LoginStage::new(
            config.security.login_path.clone(),
            authenticator,
            Arc::clone(&codec),
            header.clone(),
        );
        let verification = VerificationStage::new(
            codec,
            header,
            ExemptPaths::new(&config.security.exempt_paths),
        );
        let translation = TranslationPolicy {
            login_path: config.security.login_path.clone(),
            hide_user_not_found: config.security.hide_user_not_found,
        };

        Ok(Self {
            config: Arc::new(config),
            users,
            hashing,
            login: Arc::new(login),
            verification: Arc::new(verification),
            translation: Arc::new(translation),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                  # Health check (exempt)
/// ├── POST {login_path}             # Answered by the login stage
/// └── /api/
///     ├── POST /auth/register       # Create a `user` account (exempt)
///     └── /users/
///         ├── GET /me               # Current principal
///         └── GET /{username}       # Any account (needs `user:read`)
/// ```
///
/// Unknown paths fall through to a JSON 404, after verification.
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Logging (tower-http TraceLayer)
/// 2. Failure translator and audit log
/// 3. Security pipeline (login or verification)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new().route("/register", post(routes::auth::register));

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route("/:username", get(routes::users::get_user));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_pipeline,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            translate_failures,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
