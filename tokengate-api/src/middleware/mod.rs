/// Security pipeline middleware
///
/// - [`pipeline`]: Dispatches each request to the login or verification stage
/// - [`login`]: Login stage (credentials in, token header out)
/// - [`verification`]: Verification stage (token in, Principal attached)
/// - [`translator`]: Failure translator and audit log
///
/// Request order through the layers:
///
/// ```text
/// TraceLayer -> translator -> pipeline -> { login | verification -> handler }
/// ```

pub mod login;
pub mod pipeline;
pub mod translator;
pub mod verification;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::JwtProperties;
use crate::error::Failure;

/// Where tokens travel: the configured header name and value prefix
#[derive(Debug, Clone)]
pub struct TokenHeader {
    name: HeaderName,
    prefix: String,
}

impl TokenHeader {
    /// Builds the header description from token configuration
    pub fn from_properties(jwt: &JwtProperties) -> anyhow::Result<Self> {
        let name = HeaderName::from_bytes(jwt.authorization_header_name.as_bytes())?;
        HeaderValue::from_str(&jwt.token_prefix)?;

        Ok(Self {
            name,
            prefix: jwt.token_prefix.clone(),
        })
    }

    /// Header name
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    /// Formats `{prefix}{token}` as a header value
    pub fn value_for(&self, token: &str) -> Result<HeaderValue, Failure> {
        HeaderValue::from_str(&format!("{}{}", self.prefix, token))
            .map_err(|e| Failure::Unclassified(format!("Token is not a valid header value: {}", e)))
    }

    /// Pulls the bare token out of request headers
    ///
    /// # Errors
    ///
    /// `Failure::MissingToken` if the header is absent, is not visible ASCII,
    /// lacks the prefix, or carries an empty token.
    pub fn extract<'a>(&self, headers: &'a HeaderMap) -> Result<&'a str, Failure> {
        let value = headers
            .get(&self.name)
            .ok_or_else(|| Failure::MissingToken(format!("{} header is absent", self.name)))?;

        let value = value
            .to_str()
            .map_err(|_| Failure::MissingToken(format!("{} header is not valid ASCII", self.name)))?;

        let token = value.strip_prefix(&self.prefix).ok_or_else(|| {
            Failure::MissingToken(format!("{} header lacks the expected prefix", self.name))
        })?;

        let token = token.trim();
        if token.is_empty() {
            return Err(Failure::MissingToken(format!("{} header carries no token", self.name)));
        }

        Ok(token)
    }
}
