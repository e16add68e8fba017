// src/middleware/auth.rs
// DOCUMENTATION: Bearer-token extraction for handlers
// PURPOSE: Validate Authorization headers and expose the caller's claims

use crate::errors::ApiError;
use crate::services::{Claims, TokenService};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

/// The authenticated caller, extracted from a valid access token
/// Handlers that require login take this as a parameter
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        self.claims.user_id()
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

/// Optional authentication: present when a valid bearer token was sent,
/// None for anonymous requests. Used by feed and leaderboard reads.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().and_then(|c| c.user_id().ok())
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

fn claims_from_request(req: &HttpRequest) -> Result<Claims, ApiError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or(ApiError::InternalError)?;

    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    tokens.verify_access(token)
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map(|claims| AuthenticatedUser { claims }))
    }
}

impl FromRequest for MaybeUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(claims_from_request(req).ok())))
    }
}

/// Helper to guard admin-only endpoints
/// DOCUMENTATION: Checks the role claim of the authenticated caller
pub fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if !user.is_admin() {
        log::warn!("Admin endpoint hit by non-admin {}", user.claims.sub);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
