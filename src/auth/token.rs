use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The context a session token is issued in. Only the lifetime differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Registration,
    Login,
}

impl SessionKind {
    pub fn ttl(self) -> Duration {
        match self {
            SessionKind::Registration => Duration::hours(24),
            SessionKind::Login => Duration::hours(1),
        }
    }
}

/// Issues and verifies HS256 session tokens.
///
/// The signing secret is handed in once at construction and never changes for
/// the life of the service. Tokens are stateless: nothing is stored server-side
/// and a token stays valid until its `exp`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issues a token for `user_id` that expires `ttl` from now.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        self.issue_at(user_id, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        user_id: Uuid,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expiration = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// Returns `AppError::InvalidToken` when the token is malformed or signed with
    /// another key, and `AppError::ExpiredToken` once `now` reaches `exp`. The
    /// signature is checked first.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected token: {}", e);
                AppError::InvalidToken
            })?;

        if now.timestamp() >= claims.exp {
            return Err(AppError::ExpiredToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test_secret_for_tokens")
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, SessionKind::Login.ttl()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_session_lifetimes() {
        assert_eq!(SessionKind::Registration.ttl(), Duration::hours(24));
        assert_eq!(SessionKind::Login.ttl(), Duration::hours(1));
    }

    #[test]
    fn test_one_hour_token_expiry_boundary() {
        let tokens = service();
        let issued_at = Utc::now();
        let token = tokens
            .issue_at(Uuid::new_v4(), Duration::hours(1), issued_at)
            .unwrap();

        assert!(tokens
            .verify_at(&token, issued_at + Duration::minutes(59))
            .is_ok());
        assert!(matches!(
            tokens.verify_at(&token, issued_at + Duration::minutes(61)),
            Err(AppError::ExpiredToken)
        ));
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let token = tokens
            .issue_at(
                Uuid::new_v4(),
                Duration::hours(1),
                Utc::now() - Duration::hours(2),
            )
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = TokenService::new(b"one_secret")
            .issue(Uuid::new_v4(), Duration::hours(1))
            .unwrap();

        let result = TokenService::new(b"a_completely_different_secret").verify(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_with_foreign_signature_is_invalid() {
        let token = TokenService::new(b"one_secret")
            .issue_at(
                Uuid::new_v4(),
                Duration::hours(1),
                Utc::now() - Duration::hours(5),
            )
            .unwrap();

        let result = service().verify(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            service().verify("not.a.jwt"),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(service().verify(""), Err(AppError::InvalidToken)));
    }
}
