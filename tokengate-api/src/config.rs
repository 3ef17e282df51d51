/// Configuration management for the API server
///
/// Configuration is layered, lowest precedence first:
///
/// 1. Built-in defaults
/// 2. An optional `tokengate.{toml,yaml,json}` file in the working directory,
///    or the file named by `TOKENGATE_CONFIG`
/// 3. Environment variables prefixed `TOKENGATE_`, with `__` separating
///    nested keys
///
/// A `.env` file is loaded first when present.
///
/// # Environment Variables
///
/// - `TOKENGATE_JWT__PASSPHRASE`: HMAC passphrase, at least 32 bytes (required)
/// - `TOKENGATE_JWT__TOKEN_EXPIRATION_HOURS`: Token lifetime (default: 24)
/// - `TOKENGATE_JWT__AUTHORIZATION_HEADER_NAME`: Token header (default: Authorization)
/// - `TOKENGATE_JWT__TOKEN_PREFIX`: Token prefix (default: `Bearer `)
/// - `TOKENGATE_API__HOST` / `TOKENGATE_API__PORT`: Bind address (default: 0.0.0.0:8080)
/// - `TOKENGATE_SECURITY__LOGIN_PATH`: Login path (default: /api/login)
/// - `TOKENGATE_SECURITY__EXEMPT_PATHS`: Comma-separated public paths
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use tokengate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokengate_shared::auth::jwt::MIN_KEY_BYTES;
use tokengate_shared::models::user::{Role, UserRecord};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TOKENGATE";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Token configuration
    pub jwt: JwtProperties,

    /// Security pipeline configuration
    pub security: SecurityConfig,

    /// Accounts seeded into the user store at startup
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

/// Token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtProperties {
    /// Passphrase the HMAC signing key is derived from
    ///
    /// IMPORTANT: keep this secret. Generate with: `openssl rand -hex 32`
    pub passphrase: String,

    /// Lifetime of issued tokens, in hours
    pub token_expiration_hours: u32,

    /// Header carrying the token, on login responses and on requests
    pub authorization_header_name: String,

    /// Prefix written before the token in that header
    pub token_prefix: String,
}

impl fmt::Debug for JwtProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtProperties")
            .field("passphrase", &"[redacted]")
            .field("token_expiration_hours", &self.token_expiration_hours)
            .field("authorization_header_name", &self.authorization_header_name)
            .field("token_prefix", &self.token_prefix)
            .finish()
    }
}

/// Security pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Path handled by the login stage (POST only)
    pub login_path: String,

    /// Paths that bypass token verification
    ///
    /// Entries are exact paths, or prefixes written as `/prefix/**`.
    pub exempt_paths: Vec<String>,

    /// Answer unknown usernames at login exactly like wrong passwords
    pub hide_user_not_found: bool,

    /// Largest login body read before giving up
    pub max_login_body_bytes: usize,
}

/// Account seeded at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Username
    pub username: String,

    /// Password hash in PHC string format
    pub password_hash: String,

    /// Role to grant
    pub role: Role,
}

impl From<SeedUser> for UserRecord {
    fn from(seed: SeedUser) -> Self {
        UserRecord {
            username: seed.username,
            password_hash: seed.password_hash,
            role: seed.role,
        }
    }
}

impl Config {
    /// Loads configuration from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The passphrase is missing or shorter than 32 bytes
    /// - A value cannot be parsed into its type
    /// - Validation fails (see [`Config::validate`])
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .unwrap_or_else(|_| "tokengate".to_string());

        let config: Config = Self::defaults()?
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("security.exempt_paths"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Builder pre-populated with every default value
    pub fn defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("api.host", "0.0.0.0")?
            .set_default("api.port", 8080)?
            .set_default("api.json_logs", false)?
            .set_default("jwt.token_expiration_hours", 24)?
            .set_default("jwt.authorization_header_name", "Authorization")?
            .set_default("jwt.token_prefix", "Bearer ")?
            .set_default("security.login_path", "/api/login")?
            .set_default(
                "security.exempt_paths",
                vec![
                    "/health",
                    "/api/auth/register",
                    "/swagger-ui/**",
                    "/v3/api-docs/**",
                ],
            )?
            .set_default("security.hide_user_not_found", true)?
            .set_default("security.max_login_body_bytes", 16 * 1024)?)
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.passphrase.len() < MIN_KEY_BYTES {
            anyhow::bail!("jwt.passphrase must be at least {} bytes long", MIN_KEY_BYTES);
        }

        if self.jwt.token_expiration_hours == 0 {
            anyhow::bail!("jwt.token_expiration_hours must be greater than zero");
        }

        HeaderName::from_bytes(self.jwt.authorization_header_name.as_bytes()).map_err(|_| {
            anyhow::anyhow!(
                "jwt.authorization_header_name {:?} is not a valid header name",
                self.jwt.authorization_header_name
            )
        })?;

        HeaderValue::from_str(&self.jwt.token_prefix).map_err(|_| {
            anyhow::anyhow!("jwt.token_prefix {:?} is not a valid header value", self.jwt.token_prefix)
        })?;

        if !self.security.login_path.starts_with('/') {
            anyhow::bail!("security.login_path must start with '/'");
        }

        if let Some(path) = self.security.exempt_paths.iter().find(|p| !p.starts_with('/')) {
            anyhow::bail!("security.exempt_paths entry {:?} must start with '/'", path);
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
