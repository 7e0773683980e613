//! Session token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs. Expiry is checked here rather than by the
//! JWT library so that the boundary is exact to the millisecond and no leeway
//! applies.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::{
    errors::{AuthError, AuthResult},
    models::{SessionClaims, UserId},
};

/// Default session validity window.
pub const DEFAULT_TOKEN_VALIDITY: Duration = Duration::hours(24);

/// Signs and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the default 24-hour validity.
    pub fn new(secret: &str) -> Self {
        Self::with_validity(secret, DEFAULT_TOKEN_VALIDITY)
    }

    /// Create an issuer with a custom validity window.
    pub fn with_validity(secret: &str, validity: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity,
        }
    }

    /// Validity window applied to new tokens.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for the given user, valid from now.
    pub fn issue(&self, user_id: UserId, username: &str) -> AuthResult<String> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// The issuance time is truncated to whole seconds, so the expiry instant
    /// is exactly `iat + validity`.
    pub fn issue_at(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            iat,
            exp: iat + self.validity.num_seconds(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(token)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Bad signature, wrong algorithm, missing
    ///   claims, or `now` at or past the expiry instant
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?
            .claims;

        let expires_at_ms = claims.exp.saturating_mul(1000);
        if now.timestamp_millis() >= expires_at_ms {
            log::debug!("Token for user {} expired", claims.sub);
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
