// src/db/meditation_repository.rs
// DOCUMENTATION: Meditation catalog, session and achievement database operations
// PURPOSE: Abstract database operations from business logic

use crate::errors::ApiError;
use crate::models::{
    Achievement, CreateMeditationTypeRequest, LeaderboardRow, MeditationSession, MeditationType,
    RecordSessionRequest, SessionHistoryRow, TypeListQuery, UpdateMeditationTypeRequest,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct MeditationRepository;

impl MeditationRepository {
    /// List active catalog entries, optionally filtered
    pub async fn list_types(
        pool: &PgPool,
        query: &TypeListQuery,
    ) -> Result<Vec<MeditationType>, ApiError> {
        // Build dynamic query based on provided filters
        let mut where_clauses = vec!["is_active = true".to_string()];

        if let Some(category) = &query.category {
            where_clauses.push(format!("category = '{}'", category.replace('\'', "''")));
        }

        if let Some(difficulty) = &query.difficulty {
            where_clauses.push(format!("difficulty = '{}'", difficulty.replace('\'', "''")));
        }

        let sql = format!(
            "SELECT * FROM meditation_types WHERE {} ORDER BY name ASC",
            where_clauses.join(" AND ")
        );

        sqlx::query_as::<_, MeditationType>(&sql)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Catalog listing query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Retrieve catalog entry by ID
    pub async fn get_type_by_id(pool: &PgPool, id: Uuid) -> Result<MeditationType, ApiError> {
        sqlx::query_as::<_, MeditationType>(
            "SELECT * FROM meditation_types WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching meditation type {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Meditation type {}", id)))
    }

    /// Retrieve catalog entry by slug
    /// DOCUMENTATION: Used for GET /meditation/types/{id} when id is not a UUID
    pub async fn get_type_by_slug(pool: &PgPool, slug: &str) -> Result<MeditationType, ApiError> {
        sqlx::query_as::<_, MeditationType>(
            "SELECT * FROM meditation_types WHERE slug = $1 AND is_active = true",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching meditation type '{}': {}", slug, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Meditation type '{}'", slug)))
    }

    /// Create a catalog entry (admin)
    pub async fn create_type(
        pool: &PgPool,
        req: &CreateMeditationTypeRequest,
    ) -> Result<MeditationType, ApiError> {
        let entry = sqlx::query_as::<_, MeditationType>(
            r#"
            INSERT INTO meditation_types (
                name, slug, description, category, difficulty,
                default_duration_minutes, audio_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.slug)
        .bind(&req.description)
        .bind(&req.category)
        .bind(&req.difficulty)
        .bind(req.default_duration_minutes)
        .bind(&req.audio_url)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return ApiError::AlreadyExists(format!(
                        "Meditation type with slug '{}'",
                        req.slug
                    ));
                }
            }
            log::error!("Failed to create meditation type: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Created meditation type '{}' ({})", entry.name, entry.id);
        Ok(entry)
    }

    /// Update a catalog entry (admin)
    /// DOCUMENTATION: Partial update - only provided fields are modified
    pub async fn update_type(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateMeditationTypeRequest,
    ) -> Result<MeditationType, ApiError> {
        sqlx::query_as::<_, MeditationType>(
            r#"
            UPDATE meditation_types
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                category = COALESCE($3, category),
                difficulty = COALESCE($4, difficulty),
                default_duration_minutes = COALESCE($5, default_duration_minutes),
                audio_url = COALESCE($6, audio_url),
                updated_at = NOW()
            WHERE id = $7 AND is_active = true
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.category)
        .bind(&req.difficulty)
        .bind(req.default_duration_minutes)
        .bind(&req.audio_url)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Update failed for meditation type {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Meditation type {}", id)))
    }

    /// Soft delete a catalog entry (admin)
    pub async fn delete_type(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows = sqlx::query(
            "UPDATE meditation_types SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Delete failed for meditation type {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Meditation type {}", id)));
        }

        log::info!("Deleted meditation type {}", id);
        Ok(())
    }

    /// Record a completed session
    pub async fn insert_session(
        pool: &PgPool,
        user_id: Uuid,
        req: &RecordSessionRequest,
    ) -> Result<MeditationSession, ApiError> {
        sqlx::query_as::<_, MeditationSession>(
            r#"
            INSERT INTO meditation_sessions (
                user_id, type_id, duration_seconds, notes, completed_at, created_at
            )
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(req.type_id)
        .bind(req.duration_seconds)
        .bind(&req.notes)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to record session for {}: {}", user_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Own session history, newest first
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn session_history(
        pool: &PgPool,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<SessionHistoryRow>, i64), ApiError> {
        let offset = (page - 1) * limit;

        let count_result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM meditation_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    log::error!("Session count query error: {}", e);
                    ApiError::DatabaseError(e.to_string())
                })?;

        let rows = sqlx::query_as::<_, SessionHistoryRow>(
            r#"
            SELECT s.id, s.type_id, t.name AS type_name,
                   s.duration_seconds, s.notes, s.completed_at
            FROM meditation_sessions s
            JOIN meditation_types t ON t.id = s.type_id
            WHERE s.user_id = $1
            ORDER BY s.completed_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Session history query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok((rows, count_result.0))
    }

    /// Distinct UTC dates with at least one completed session, newest first
    /// Feeds the pure streak computation in services::streak_service
    pub async fn session_dates(pool: &PgPool, user_id: Uuid) -> Result<Vec<NaiveDate>, ApiError> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT (completed_at AT TIME ZONE 'UTC')::date AS day
            FROM meditation_sessions
            WHERE user_id = $1
            ORDER BY day DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Session dates query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    /// Lifetime totals: (session count, total seconds)
    pub async fn user_totals(pool: &PgPool, user_id: Uuid) -> Result<(i64, i64), ApiError> {
        let row: (i64, Option<i64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), SUM(duration_seconds)::bigint
            FROM meditation_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("User totals query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok((row.0, row.1.unwrap_or(0)))
    }

    /// Ranked users by meditation minutes since the given instant
    pub async fn leaderboard(
        pool: &PgPool,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, ApiError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                RANK() OVER (ORDER BY SUM(s.duration_seconds) DESC) AS rank,
                u.id AS user_id,
                u.username,
                (SUM(s.duration_seconds) / 60)::bigint AS total_minutes,
                COUNT(s.id)::bigint AS total_sessions,
                0::bigint AS current_streak_days
            FROM meditation_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE u.is_active = true
              AND ($1::timestamptz IS NULL OR s.completed_at >= $1)
            GROUP BY u.id, u.username
            ORDER BY SUM(s.duration_seconds) DESC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Leaderboard query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(rows)
    }

    /// The caller's own leaderboard row, None when they have no sessions in the period
    pub async fn user_rank(
        pool: &PgPool,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Option<LeaderboardRow>, ApiError> {
        sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT rank, user_id, username, total_minutes, total_sessions, current_streak_days
            FROM (
                SELECT
                    RANK() OVER (ORDER BY SUM(s.duration_seconds) DESC) AS rank,
                    u.id AS user_id,
                    u.username,
                    (SUM(s.duration_seconds) / 60)::bigint AS total_minutes,
                    COUNT(s.id)::bigint AS total_sessions,
                    0::bigint AS current_streak_days
                FROM meditation_sessions s
                JOIN users u ON u.id = s.user_id
                WHERE u.is_active = true
                  AND ($2::timestamptz IS NULL OR s.completed_at >= $2)
                GROUP BY u.id, u.username
            ) ranked
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("User rank query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Award an achievement once
    /// DOCUMENTATION: Idempotent - returns None when the user already holds the code
    pub async fn insert_achievement(
        pool: &PgPool,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Achievement>, ApiError> {
        sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements (user_id, code, earned_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, code) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to award achievement {} to {}: {}", code, user_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// All achievements held by a user, newest first
    pub async fn list_achievements(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Achievement>, ApiError> {
        sqlx::query_as::<_, Achievement>(
            "SELECT * FROM achievements WHERE user_id = $1 ORDER BY earned_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Achievement listing query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Total recorded sessions across all users, for admin stats
    pub async fn count_sessions(pool: &PgPool) -> Result<i64, ApiError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM meditation_sessions")
            .fetch_one(pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }
}
