// src/handlers/admin.rs
// DOCUMENTATION: Admin user-management console handlers
// PURPOSE: Expose account moderation via REST endpoints

use crate::db::{MeditationRepository, StoryRepository, UserRepository};
use crate::errors::ApiError;
use crate::middleware::{require_admin, AuthenticatedUser};
use crate::models::{
    UpdateRoleRequest, UpdateStatusRequest, UserListQuery, UserListResponse,
};
use crate::services::ProfileCache;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const KNOWN_ROLES: [&str; 3] = ["user", "moderator", "admin"];

/// Response for the admin stats endpoint
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub verified_users: i64,
    pub signups_last_24h: i64,
    pub total_sessions: i64,
    pub total_stories: i64,
    pub profile_cache: crate::services::CacheStats,
}

/// GET /api/admin/usermgmt/users
/// Paginated account listing with filters
pub async fn list_users(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let (users, total_count) = UserRepository::list(pool.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users.iter().map(|u| u.to_admin_response()).collect(),
        total_count,
        page,
        limit,
        has_more: total_count > page * limit,
    }))
}

/// GET /api/admin/usermgmt/users/{id}
/// Full admin view of one account
pub async fn get_user(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    let target = UserRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(target.to_admin_response()))
}

/// PUT /api/admin/usermgmt/users/{id}/role
/// Change an account's role
pub async fn update_role(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ProfileCache>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateRoleRequest>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    if !KNOWN_ROLES.contains(&req.role.as_str()) {
        return Err(ApiError::InvalidInput(format!("Unknown role '{}'", req.role)));
    }

    let updated = UserRepository::update_role(pool.get_ref(), path.into_inner(), &req.role).await?;
    cache.invalidate(&updated.username).await;

    log::info!("Admin {} set role {} on {}", user.claims.sub, req.role, updated.id);
    Ok(HttpResponse::Ok().json(updated.to_admin_response()))
}

/// PUT /api/admin/usermgmt/users/{id}/status
/// Activate or deactivate an account
/// Admins cannot deactivate their own account
pub async fn update_status(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ProfileCache>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    let target_id = path.into_inner();
    if !req.active && target_id == user.user_id()? {
        return Err(ApiError::InvalidInput(
            "Admins cannot deactivate their own account".to_string(),
        ));
    }

    let updated = UserRepository::update_status(pool.get_ref(), target_id, req.active).await?;
    cache.invalidate(&updated.username).await;

    log::info!(
        "Admin {} set active={} on {}",
        user.claims.sub,
        req.active,
        updated.id
    );
    Ok(HttpResponse::Ok().json(updated.to_admin_response()))
}

/// DELETE /api/admin/usermgmt/users/{id}
/// Soft delete an account
pub async fn delete_user(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ProfileCache>>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    let target_id = path.into_inner();
    if target_id == user.user_id()? {
        return Err(ApiError::InvalidInput(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    let target = UserRepository::get_by_id(pool.get_ref(), target_id).await?;
    UserRepository::soft_delete(pool.get_ref(), target_id).await?;
    cache.invalidate(&target.username).await;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/usermgmt/stats
/// Aggregate platform statistics
pub async fn admin_stats(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ProfileCache>>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    let (total_users, active_users, verified_users, signups_last_24h) =
        UserRepository::stats(pool.get_ref()).await?;
    let total_sessions = MeditationRepository::count_sessions(pool.get_ref()).await?;
    let total_stories = StoryRepository::count_stories(pool.get_ref()).await?;

    let response = AdminStatsResponse {
        total_users,
        active_users,
        verified_users,
        signups_last_24h,
        total_sessions,
        total_stories,
        profile_cache: cache.stats().await,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin/usermgmt")
            .route("/users", web::get().to(list_users))
            .route("/users/{id}", web::get().to(get_user))
            .route("/users/{id}/role", web::put().to(update_role))
            .route("/users/{id}/status", web::put().to(update_status))
            .route("/users/{id}", web::delete().to(delete_user))
            .route("/stats", web::get().to(admin_stats)),
    );
}
