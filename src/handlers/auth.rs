// src/handlers/auth.rs
// DOCUMENTATION: HTTP handlers for authentication
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::errors::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, RequestOtpRequest,
    ResetPasswordRequest, VerifyOtpRequest,
};
use crate::services::{AuthService, EmailService, TokenService, OTP_PURPOSE_RESET};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /api/auth/register
/// Create an account and issue a signup verification code
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    email_service: web::Data<EmailService>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let user = AuthService::register(
        pool.get_ref(),
        email_service.get_ref(),
        config.otp_ttl_minutes,
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// POST /api/auth/login
/// Authenticate and return a token pair plus the profile
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<LoginRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let response = AuthService::login(pool.get_ref(), tokens.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/auth/refresh-token
/// Rotate an access/refresh pair; the SPA interceptor calls this on 401
pub async fn refresh_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, ApiError> {
    let pair =
        AuthService::refresh(pool.get_ref(), tokens.get_ref(), &req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// POST /api/auth/request-otp
/// Issue a one-time code for signup verification or password reset
pub async fn request_otp(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    email_service: web::Data<EmailService>,
    req: web::Json<RequestOtpRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    AuthService::request_otp(
        pool.get_ref(),
        email_service.get_ref(),
        config.otp_ttl_minutes,
        &req.email,
        &req.purpose,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "sent": true })))
}

/// POST /api/auth/verify-otp
/// Consume a verification code and mark the account verified
pub async fn verify_otp(
    pool: web::Data<PgPool>,
    req: web::Json<VerifyOtpRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    AuthService::verify_otp(pool.get_ref(), &req.email, &req.code).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "verified": true })))
}

/// POST /api/auth/forgot-password
/// Always responds 200 so the endpoint cannot be used to enumerate accounts
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    email_service: web::Data<EmailService>,
    req: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    AuthService::request_otp(
        pool.get_ref(),
        email_service.get_ref(),
        config.otp_ttl_minutes,
        &req.email,
        OTP_PURPOSE_RESET,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "sent": true })))
}

/// POST /api/auth/reset-password
/// Consume a reset code and replace the password
pub async fn reset_password(
    pool: web::Data<PgPool>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    AuthService::reset_password(pool.get_ref(), &req.email, &req.code, &req.new_password).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "reset": true })))
}

/// GET /api/auth/me
/// Current profile for the bearer token
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let profile = AuthService::current_user(pool.get_ref(), user.user_id()?).await?;
    Ok(HttpResponse::Ok().json(profile.to_public()))
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh-token", web::post().to(refresh_token))
            .route("/request-otp", web::post().to(request_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password))
            .route("/me", web::get().to(me)),
    );
}
