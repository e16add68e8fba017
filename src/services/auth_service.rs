// src/services/auth_service.rs
// DOCUMENTATION: Account lifecycle business logic
// PURPOSE: Registration, login, token refresh, OTP verification, password reset

use crate::db::{OtpRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, PublicUser, RegisterRequest, TokenResponse, User,
};
use crate::services::{EmailService, TokenService};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use sqlx::PgPool;

/// OTP code length
const OTP_LENGTH: usize = 6;

pub const OTP_PURPOSE_VERIFY: &str = "verify";
pub const OTP_PURPOSE_RESET: &str = "reset";

/// Hash a password using Argon2id with a random per-password salt
/// Strength rules are enforced before hashing
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            ApiError::InternalError
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its PHC-formatted hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        log::error!("Invalid password hash format: {}", e);
        ApiError::InternalError
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            log::error!("Password verification failed: {}", e);
            Err(ApiError::InternalError)
        }
    }
}

/// Composition rules: at least 8 characters with upper, lower and digit
fn validate_password_strength(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}

/// Generate a numeric one-time code
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub struct AuthService;

impl AuthService {
    /// Register a new account and issue a signup verification code
    pub async fn register(
        pool: &PgPool,
        email_service: &EmailService,
        otp_ttl_minutes: i64,
        req: RegisterRequest,
    ) -> Result<PublicUser, ApiError> {
        let password_hash = hash_password(&req.password)?;
        let user =
            UserRepository::create_user(pool, &req.username, &req.email, &password_hash).await?;

        let code = generate_otp();
        OtpRepository::issue(pool, user.id, &code, OTP_PURPOSE_VERIFY, otp_ttl_minutes).await?;
        email_service.send_otp(&user.email, OTP_PURPOSE_VERIFY, &code);

        Ok(user.to_public())
    }

    /// Authenticate and issue a token pair
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        req: LoginRequest,
    ) -> Result<LoginResponse, ApiError> {
        let user = UserRepository::find_by_email(pool, &req.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            log::warn!("Failed login attempt for {}", req.email);
            return Err(ApiError::InvalidCredentials);
        }

        if !user.is_active {
            log::warn!("Login attempt for deactivated account {}", user.id);
            return Err(ApiError::Forbidden);
        }

        let pair = tokens.generate_token_pair(&user)?;
        log::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            tokens: pair,
            user: user.to_public(),
        })
    }

    /// Rotate a token pair from a refresh token
    /// The account must still exist and be active
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenService,
        refresh_token: &str,
    ) -> Result<TokenResponse, ApiError> {
        let claims = tokens.verify_refresh(refresh_token)?;
        let user = UserRepository::get_by_id(pool, claims.user_id()?)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        if !user.is_active {
            return Err(ApiError::Forbidden);
        }

        tokens.generate_token_pair(&user)
    }

    /// Issue a one-time code for signup verification or password reset
    /// Always succeeds from the caller's perspective to avoid account enumeration
    pub async fn request_otp(
        pool: &PgPool,
        email_service: &EmailService,
        otp_ttl_minutes: i64,
        email: &str,
        purpose: &str,
    ) -> Result<(), ApiError> {
        if purpose != OTP_PURPOSE_VERIFY && purpose != OTP_PURPOSE_RESET {
            return Err(ApiError::InvalidInput(format!(
                "Unknown OTP purpose '{}'",
                purpose
            )));
        }

        match UserRepository::find_by_email(pool, email).await? {
            Some(user) => {
                let code = generate_otp();
                OtpRepository::issue(pool, user.id, &code, purpose, otp_ttl_minutes).await?;
                email_service.send_otp(&user.email, purpose, &code);
            }
            None => {
                log::info!("OTP requested for unknown email");
            }
        }

        Ok(())
    }

    /// Consume a verification code and mark the account verified
    pub async fn verify_otp(pool: &PgPool, email: &str, code: &str) -> Result<(), ApiError> {
        let user = UserRepository::find_by_email(pool, email)
            .await?
            .ok_or(ApiError::OtpInvalid)?;

        if !OtpRepository::consume(pool, user.id, code, OTP_PURPOSE_VERIFY).await? {
            return Err(ApiError::OtpInvalid);
        }

        UserRepository::set_verified(pool, user.id).await?;
        log::info!("User {} verified their email", user.id);
        Ok(())
    }

    /// Consume a reset code and replace the password
    pub async fn reset_password(
        pool: &PgPool,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let user = UserRepository::find_by_email(pool, email)
            .await?
            .ok_or(ApiError::OtpInvalid)?;

        if !OtpRepository::consume(pool, user.id, code, OTP_PURPOSE_RESET).await? {
            return Err(ApiError::OtpInvalid);
        }

        let password_hash = hash_password(new_password)?;
        UserRepository::update_password(pool, user.id, &password_hash).await
    }

    /// Current profile from a validated access token
    pub async fn current_user(pool: &PgPool, user_id: uuid::Uuid) -> Result<User, ApiError> {
        let user = UserRepository::get_by_id(pool, user_id).await?;
        if !user.is_active {
            return Err(ApiError::Forbidden);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_valid_password() {
        let password = "StrongPass1";
        let hash = hash_password(password).expect("should hash password successfully");
        assert!(verify_password(password, &hash).expect("should verify successfully"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let password = "StrongPass1";
        let hash = hash_password(password).expect("should hash password successfully");
        assert!(!verify_password("WrongPass2", &hash).expect("verification should succeed"));
    }

    #[test]
    fn test_weak_password_too_short() {
        assert!(matches!(
            hash_password("Sh0rt"),
            Err(ApiError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_weak_password_no_uppercase() {
        assert!(matches!(
            hash_password("weakpassword1"),
            Err(ApiError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_weak_password_no_digit() {
        assert!(matches!(
            hash_password("WeakPassword"),
            Err(ApiError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "StrongPass1";
        let hash1 = hash_password(password).expect("should hash successfully");
        let hash2 = hash_password(password).expect("should hash successfully");
        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_otp_shape() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
