//! Bearer tokens minted by this server.
//!
//! Tokens are HS256 JWTs carrying only the user id (`sub`), `iat` and `exp`.
//! Verification is stateless; the signing key lives in [`Config`] and is never
//! rotated while the process runs.
//!
//! [`Config`]: crate::config::Config

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SigningKey;
use crate::error::AuthError;

pub const TOKEN_VALIDITY_HOURS: i64 = 24;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Identity of a caller whose bearer token verified. The field is private, so
/// the only way to get one is [`TokenIssuer::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: i64,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mints a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at + Duration::hours(TOKEN_VALIDITY_HOURS);
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(AuthError::Signing)?;
        debug!("Issued token for user {} expiring at {}", user_id, expires_at);

        Ok(IssuedToken { token, expires_at })
    }

    /// Every failure collapses into [`AuthError::TokenInvalid`]; the actual
    /// reason only goes to the debug log.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!("Rejecting bearer token: {}", e);
                AuthError::TokenInvalid
            })?;

        let user_id = data.claims.sub.parse::<i64>().map_err(|_| {
            debug!("Rejecting bearer token: non-numeric subject {:?}", data.claims.sub);
            AuthError::TokenInvalid
        })?;

        Ok(AuthenticatedUser { user_id })
    }
}
