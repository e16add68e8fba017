// src/services/token.rs
// DOCUMENTATION: Access/refresh token issuing and validation (HS256)
// PURPOSE: Stateless JWT pairs consumed by the SPA's refresh interceptor

use crate::errors::ApiError;
use crate::models::{TokenResponse, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims: standard fields plus profile data the SPA reads directly
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub).map_err(|_| ApiError::Unauthorized)
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Token issuing/verification service
/// DOCUMENTATION: One instance per process, cloned into handlers as app data
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn generate_token_pair(&self, user: &User) -> Result<TokenResponse, ApiError> {
        let now = Utc::now();
        let access_exp = now + Duration::minutes(self.access_ttl_minutes);
        let refresh_exp = now + Duration::days(self.refresh_ttl_days);

        let access_token =
            self.encode_claims(user, now.timestamp(), access_exp.timestamp(), TOKEN_TYPE_ACCESS)?;
        let refresh_token = self.encode_claims(
            user,
            now.timestamp(),
            refresh_exp.timestamp(),
            TOKEN_TYPE_REFRESH,
        )?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_minutes * 60,
        })
    }

    /// Validate a bearer token and require the access type
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.decode_claims(token)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(ApiError::Unauthorized);
        }
        Ok(claims)
    }

    /// Validate a refresh token and require the refresh type
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        let claims = self.decode_claims(token)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(ApiError::Unauthorized);
        }
        Ok(claims)
    }

    fn encode_claims(
        &self,
        user: &User,
        iat: i64,
        exp: i64,
        token_type: &str,
    ) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user.id.to_string(),
            iat,
            exp,
            token_type: token_type.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            log::error!("Token encoding failed: {}", e);
            ApiError::InternalError
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::Unauthorized,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "unused".to_string(),
            role: "user".to_string(),
            bio: None,
            avatar_url: None,
            is_verified: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", 60, 30)
    }

    #[test]
    fn test_token_pair_roundtrip() {
        let svc = service();
        let user = test_user();
        let pair = svc.generate_token_pair(&user).expect("pair");

        let access = svc.verify_access(&pair.access_token).expect("access claims");
        assert_eq!(access.sub, user.id.to_string());
        assert_eq!(access.username, "alice");
        assert_eq!(access.token_type, "access");
        assert_eq!(access.user_id().unwrap(), user.id);

        let refresh = svc.verify_refresh(&pair.refresh_token).expect("refresh claims");
        assert_eq!(refresh.token_type, "refresh");
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service();
        let pair = svc.generate_token_pair(&test_user()).expect("pair");

        let result = svc.verify_access(&pair.refresh_token);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let svc = service();
        let pair = svc.generate_token_pair(&test_user()).expect("pair");

        let result = svc.verify_refresh(&pair.access_token);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::new("unit-test-secret", -10, 30);
        let pair = svc.generate_token_pair(&test_user()).expect("pair");

        let result = svc.verify_access(&pair.access_token);
        assert!(matches!(result, Err(ApiError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let pair = svc.generate_token_pair(&test_user()).expect("pair");

        let other = TokenService::new("another-secret", 60, 30);
        let result = other.verify_access(&pair.access_token);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service();
        assert!(matches!(
            svc.verify_access("not-a-token"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_expires_in_matches_ttl() {
        let svc = service();
        let pair = svc.generate_token_pair(&test_user()).expect("pair");
        assert_eq!(pair.expires_in, 3600);
        assert_eq!(pair.token_type, "Bearer");
    }
}
