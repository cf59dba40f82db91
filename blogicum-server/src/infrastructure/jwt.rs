use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

/// Session claims carried by the bearer token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) exp: i64,
}

pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;
    const LEEWAY_SECONDS: u64 = 10;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub(crate) fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub(crate) fn generate_token(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        let exp = (Utc::now() + Duration::seconds(self.ttl_seconds)).timestamp();
        self.encode_claims(&Claims {
            user_id,
            username: username.into(),
            exp,
        })
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{Claims, JwtError, JwtService};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_carries_user_identity() {
        let jwt = JwtService::new(SECRET, 60);
        let token = jwt.generate_token(7, "author").expect("encode must succeed");

        let claims = jwt.verify_token(&token).expect("token must verify");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "author");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn non_positive_ttl_falls_back_to_default() {
        assert_eq!(JwtService::new(SECRET, 0).ttl_seconds(), 24 * 60 * 60);
        assert_eq!(JwtService::new(SECRET, -5).ttl_seconds(), 24 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtService::new("another-secret-another-secret-xx", 60)
            .generate_token(1, "author")
            .expect("encode must succeed");

        let err = JwtService::new(SECRET, 60)
            .verify_token(&token)
            .expect_err("foreign token must fail");
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new(SECRET, 60);
        let token = jwt
            .encode_claims(&Claims {
                user_id: 1,
                username: "author".to_string(),
                exp: (Utc::now() - Duration::minutes(5)).timestamp(),
            })
            .expect("encode must succeed");

        assert!(matches!(jwt.verify_token(&token), Err(JwtError::Decode(_))));
    }
}
