//! Access token validation.
//!
//! Tokens are issued by the managed auth backend and signed with a shared
//! HS256 secret. This service only verifies them.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use atelier_core::config::AuthConfig;
use atelier_core::error::AppError;
use atelier_core::types::id::UserId;
use atelier_service::RequestContext;

/// Claims read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user id.
    pub sub: UserId,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Role claim, if the issuer sets one.
    #[serde(default)]
    pub role: Option<String>,
    /// Email claim, if present.
    #[serde(default)]
    pub email: Option<String>,
}

impl Claims {
    /// Build the request context these claims authenticate.
    pub fn into_context(self) -> RequestContext {
        RequestContext::new(self.sub, self.role, self.email)
    }
}

/// Verifies access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Create a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        AppError::authentication("Token audience mismatch")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use atelier_core::error::ErrorKind;

    use super::*;

    pub(crate) const SECRET: &str = "test-secret";

    pub(crate) fn token_for(user: UserId, secret: &str, ttl_seconds: i64) -> String {
        let claims = Claims {
            sub: user,
            exp: Utc::now().timestamp() + ttl_seconds,
            role: Some("authenticated".to_string()),
            email: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token")
    }

    pub(crate) fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            audience: None,
            leeway_seconds: 0,
        }
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let user = UserId::new();
        let claims = JwtDecoder::new(&config())
            .decode_access_token(&token_for(user, SECRET, 600))
            .expect("valid token");
        assert_eq!(claims.sub, user);
        assert_eq!(claims.into_context().user_id, user);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let err = JwtDecoder::new(&config())
            .decode_access_token(&token_for(UserId::new(), SECRET, -600))
            .expect_err("expired");
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let err = JwtDecoder::new(&config())
            .decode_access_token(&token_for(UserId::new(), "other-secret", 600))
            .expect_err("bad signature");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
