// src/handlers/meditation.rs
// DOCUMENTATION: HTTP handlers for the catalog and session tracking
// PURPOSE: Parse requests, call services, return responses

use crate::db::MeditationRepository;
use crate::errors::ApiError;
use crate::middleware::{require_admin, AuthenticatedUser};
use crate::models::{
    CreateMeditationTypeRequest, RecordSessionRequest, SessionHistoryResponse, SessionListQuery,
    TypeListQuery, UpdateMeditationTypeRequest,
};
use crate::services::StreakService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const KNOWN_DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

fn check_difficulty(difficulty: &str) -> Result<(), ApiError> {
    if !KNOWN_DIFFICULTIES.contains(&difficulty) {
        return Err(ApiError::InvalidInput(format!(
            "Unknown difficulty '{}'",
            difficulty
        )));
    }
    Ok(())
}

/// GET /api/meditation/types
/// Browse the active catalog
pub async fn list_types(
    pool: web::Data<PgPool>,
    query: web::Query<TypeListQuery>,
) -> Result<impl Responder, ApiError> {
    let types = MeditationRepository::list_types(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(types))
}

/// GET /api/meditation/types/{id}
/// Retrieve one catalog entry by UUID or slug
pub async fn get_type(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let identifier = path.into_inner();

    // Try to parse as UUID first; otherwise treat as slug
    let entry = if let Ok(uuid) = Uuid::parse_str(&identifier) {
        MeditationRepository::get_type_by_id(pool.get_ref(), uuid).await?
    } else {
        MeditationRepository::get_type_by_slug(pool.get_ref(), &identifier).await?
    };

    Ok(HttpResponse::Ok().json(entry))
}

/// POST /api/meditation/types
/// Add a catalog entry (admin)
pub async fn create_type(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<CreateMeditationTypeRequest>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }
    check_difficulty(&req.difficulty)?;

    let entry = MeditationRepository::create_type(pool.get_ref(), &req).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// PUT /api/meditation/types/{id}
/// Update a catalog entry (admin)
pub async fn update_type(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMeditationTypeRequest>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    if let Some(difficulty) = &req.difficulty {
        check_difficulty(difficulty)?;
    }

    let entry =
        MeditationRepository::update_type(pool.get_ref(), path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// DELETE /api/meditation/types/{id}
/// Soft delete a catalog entry (admin)
pub async fn delete_type(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    require_admin(&user)?;

    MeditationRepository::delete_type(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/meditation/session
/// Record a completed session; responds with streak and new achievements
pub async fn record_session(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<RecordSessionRequest>,
) -> Result<impl Responder, ApiError> {
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let response =
        StreakService::record_session(pool.get_ref(), user.user_id()?, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// GET /api/meditation/sessions
/// Own session history, newest first
pub async fn session_history(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<SessionListQuery>,
) -> Result<impl Responder, ApiError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);

    let (sessions, total_count) =
        MeditationRepository::session_history(pool.get_ref(), user.user_id()?, page, limit)
            .await?;

    Ok(HttpResponse::Ok().json(SessionHistoryResponse {
        data: sessions,
        total_count,
        page,
        limit,
        has_more: total_count > page * limit,
    }))
}

/// GET /api/meditation/stats
/// Dashboard statistics for the caller
pub async fn user_stats(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let stats = StreakService::user_stats(pool.get_ref(), user.user_id()?).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configuration for meditation routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/meditation")
            .route("/types", web::get().to(list_types))
            .route("/types", web::post().to(create_type))
            .route("/types/{id}", web::get().to(get_type))
            .route("/types/{id}", web::put().to(update_type))
            .route("/types/{id}", web::delete().to(delete_type))
            .route("/session", web::post().to(record_session))
            .route("/sessions", web::get().to(session_history))
            .route("/stats", web::get().to(user_stats)),
    );
}
