// src/handlers/dashboard.rs
// DOCUMENTATION: Leaderboard handler
// PURPOSE: Ranked community view over meditation minutes

use crate::errors::ApiError;
use crate::middleware::MaybeUser;
use crate::models::LeaderboardQuery;
use crate::services::StreakService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /api/leaderboard
/// Ranked users for a period; includes the caller's own row when authenticated
pub async fn leaderboard(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<LeaderboardQuery>,
) -> Result<impl Responder, ApiError> {
    let response =
        StreakService::leaderboard(pool.get_ref(), &query, viewer.user_id()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Configuration for dashboard routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/leaderboard", web::get().to(leaderboard));
}
