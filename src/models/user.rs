// src/models/user.rs
// DOCUMENTATION: Core data structures for user accounts
// PURPOSE: Defines serialization/deserialization models for auth and admin APIs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a complete user record from the database
/// DOCUMENTATION: This struct maps directly to the users table in PostgreSQL
/// Used for internal operations and database queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique identifier (UUID v4)
    pub id: Uuid,

    /// Unique handle used for @mentions and display
    pub username: String,

    /// Unique email address (login identifier)
    pub email: String,

    /// Argon2id PHC-formatted password hash - never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role: user, moderator, admin
    pub role: String,

    /// Free-form profile text
    pub bio: Option<String>,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Whether the email address passed OTP verification
    pub is_verified: bool,

    /// Soft delete / deactivation flag (true = active)
    pub is_active: bool,

    /// When record was created
    pub created_at: DateTime<Utc>,

    /// When record was last modified
    pub updated_at: DateTime<Utc>,
}

/// Public profile DTO exposed via API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin view of a user, including moderation fields
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Convert database User into public API response
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            created_at: self.created_at,
        }
    }

    /// Convert database User into admin API response
    pub fn to_admin_response(&self) -> AdminUserResponse {
        AdminUserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            is_verified: self.is_verified,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Request DTO for POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Handle: letters, digits and underscores only
    #[validate(length(min = 3, max = 30), regex = "crate::models::USERNAME_RE")]
    pub username: String,

    #[validate(email)]
    pub email: String,

    /// Plaintext password, strength-checked before hashing
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Request DTO for POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Request DTO for POST /api/auth/refresh-token
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request DTO for POST /api/auth/request-otp
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpRequest {
    #[validate(email)]
    pub email: String,

    /// "verify" for signup confirmation, "reset" for password reset
    pub purpose: String,
}

/// Request DTO for POST /api/auth/verify-otp
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 6))]
    pub code: String,
}

/// Request DTO for POST /api/auth/forgot-password
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Request DTO for POST /api/auth/reset-password
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 6))]
    pub code: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Full login response: tokens plus the authenticated profile
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub user: PublicUser,
}

/// Admin request to change a user's role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Admin request to activate or deactivate a user
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub active: bool,
}

/// Query parameters for the admin user listing
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// Free-text filter on username and email
    pub q: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Paginated admin user listing
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<AdminUserResponse>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}
