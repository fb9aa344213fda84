//! Shared-secret request authorization (`Authorization: Bearer <secret>`).

use subtle::ConstantTimeEq;
use tracing::debug;

use mailgate_core::config::AuthConfig;
use mailgate_core::error::AppError;
use mailgate_core::result::AppResult;

use crate::secret::SharedSecret;

/// Required prefix of the authorization header value.
const BEARER_PREFIX: &str = "Bearer ";

/// Gates API access on the static shared secret.
///
/// This is separate from session tokens: the bearer secret proves the
/// caller is an authorized client, the session token stands in for mail
/// credentials.
#[derive(Clone)]
pub struct RequestAuthorizer {
    secret: SharedSecret,
    /// Endpoint that bypasses authorization.
    health_endpoint: String,
}

impl std::fmt::Debug for RequestAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthorizer")
            .field("health_endpoint", &self.health_endpoint)
            .finish()
    }
}

impl RequestAuthorizer {
    /// Create an authorizer checking against `secret`.
    pub fn new(secret: SharedSecret, config: &AuthConfig) -> Self {
        Self {
            secret,
            health_endpoint: config.health_endpoint.clone(),
        }
    }

    /// Check an `Authorization` header value.
    pub fn authorize(&self, header_value: &str) -> AppResult<()> {
        self.authorize_header(Some(header_value))
    }

    /// Check an optional `Authorization` header value.
    pub fn authorize_header(&self, header_value: Option<&str>) -> AppResult<()> {
        let Some(value) = header_value.filter(|v| !v.is_empty()) else {
            debug!("Rejected request: no authorization header");
            return Err(AppError::unauthorized("Authorization header missing"));
        };

        let Some(presented) = value.strip_prefix(BEARER_PREFIX) else {
            debug!("Rejected request: not a bearer header");
            return Err(AppError::unauthorized("Invalid authorization format"));
        };

        if bool::from(presented.as_bytes().ct_eq(self.secret.expose())) {
            Ok(())
        } else {
            debug!("Rejected request: wrong bearer secret");
            Err(AppError::unauthorized("Invalid authorization token"))
        }
    }

    /// Check a call to `endpoint`. The health check needs no authorization.
    pub fn authorize_call(&self, endpoint: &str, header_value: Option<&str>) -> AppResult<()> {
        if endpoint == self.health_endpoint {
            return Ok(());
        }
        self.authorize_header(header_value)
    }
}
