// src/handlers/stories.rs
// DOCUMENTATION: HTTP handlers for the community feed
// PURPOSE: Parse requests, call services, return responses

use crate::errors::ApiError;
use crate::middleware::{AuthenticatedUser, MaybeUser};
use crate::models::{
    CommentListQuery, CreateCommentRequest, CreateStoryRequest, FeedQuery, TrendingQuery,
};
use crate::services::{FeedService, ProfileCache};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// POST /api/stories
/// Publish a story; hashtags and mentions are extracted from the body
pub async fn create_story(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ProfileCache>>,
    user: AuthenticatedUser,
    req: web::Json<CreateStoryRequest>,
) -> Result<impl Responder, ApiError> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let story = FeedService::create_story(
        pool.get_ref(),
        cache.get_ref(),
        user.user_id()?,
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(story))
}

/// GET /api/stories
/// Paginated feed; `liked` flags are filled in for authenticated callers
pub async fn feed(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<FeedQuery>,
) -> Result<impl Responder, ApiError> {
    let response = FeedService::feed(pool.get_ref(), query.into_inner(), viewer.user_id()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/stories/{id}
/// One story with its comments
pub async fn story_detail(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let detail =
        FeedService::story_detail(pool.get_ref(), path.into_inner(), viewer.user_id()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// DELETE /api/stories/{id}
/// Soft delete a story (author or admin)
pub async fn delete_story(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    FeedService::delete_story(
        pool.get_ref(),
        path.into_inner(),
        user.user_id()?,
        user.is_admin(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/stories/{id}/like
/// Idempotent like
pub async fn like_story(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let story = FeedService::like_story(pool.get_ref(), path.into_inner(), user.user_id()?).await?;
    Ok(HttpResponse::Ok().json(story))
}

/// DELETE /api/stories/{id}/like
/// Idempotent unlike
pub async fn unlike_story(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let story =
        FeedService::unlike_story(pool.get_ref(), path.into_inner(), user.user_id()?).await?;
    Ok(HttpResponse::Ok().json(story))
}

/// POST /api/stories/{id}/comments
/// Comment on a story
pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let comment = FeedService::create_comment(
        pool.get_ref(),
        path.into_inner(),
        user.user_id()?,
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/stories/{id}/comments
/// Paginated comments, oldest first
pub async fn list_comments(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<CommentListQuery>,
) -> Result<impl Responder, ApiError> {
    let response =
        FeedService::comments(pool.get_ref(), path.into_inner(), query.page, query.limit).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/comments/{id}
/// Soft delete a comment (author or admin)
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    FeedService::delete_comment(
        pool.get_ref(),
        path.into_inner(),
        user.user_id()?,
        user.is_admin(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/hashtags/trending
/// Hashtags ranked by use over the last week
pub async fn trending_hashtags(
    pool: web::Data<PgPool>,
    query: web::Query<TrendingQuery>,
) -> Result<impl Responder, ApiError> {
    let hashtags = FeedService::trending_hashtags(pool.get_ref(), query.limit).await?;
    Ok(HttpResponse::Ok().json(hashtags))
}

/// Configuration for feed routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/stories")
            .route("", web::post().to(create_story))
            .route("", web::get().to(feed))
            .route("/{id}", web::get().to(story_detail))
            .route("/{id}", web::delete().to(delete_story))
            .route("/{id}/like", web::post().to(like_story))
            .route("/{id}/like", web::delete().to(unlike_story))
            .route("/{id}/comments", web::post().to(create_comment))
            .route("/{id}/comments", web::get().to(list_comments)),
    );
    cfg.service(
        web::scope("/api/comments").route("/{id}", web::delete().to(delete_comment)),
    );
    cfg.service(
        web::scope("/api/hashtags").route("/trending", web::get().to(trending_hashtags)),
    );
}
