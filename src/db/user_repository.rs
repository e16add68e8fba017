// src/db/user_repository.rs
// DOCUMENTATION: User database operations
// PURPOSE: Account CRUD plus the admin user-management listing

use crate::errors::ApiError;
use crate::models::{User, UserListQuery};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Create a new account with an already-hashed password
    /// DOCUMENTATION: Unique violations on username/email surface as 409
    /// The very first account bootstraps as admin
    pub async fn create_user(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at, updated_at)
            VALUES (
                $1, $2, $3,
                CASE WHEN (SELECT COUNT(*) FROM users) = 0 THEN 'admin' ELSE 'user' END,
                NOW(), NOW()
            )
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return ApiError::AlreadyExists(format!(
                        "Account with username '{}' or email '{}' already exists",
                        username, email
                    ));
                }
            }
            log::error!("Failed to create user {}: {}", username, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Retrieve user by ID
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching user {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))
    }

    /// Look up a user by email, None when absent
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching user by email: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Look up a user by username (case-insensitive), None when absent
    /// Used by the feed service to resolve @mentions
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching user by username: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Mark an account's email address as verified
    pub async fn set_verified(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET is_verified = true, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to mark user {} verified: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }

    /// Replace an account's password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        let rows = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update password for {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("User {}", id)));
        }

        log::info!("Password updated for user {}", id);
        Ok(())
    }

    /// Admin listing with free-text and attribute filters
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        query: &UserListQuery,
    ) -> Result<(Vec<User>, i64), ApiError> {
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1) * limit;

        // Build dynamic query based on provided filters
        let mut where_clauses = vec!["TRUE".to_string()];

        if let Some(q) = &query.q {
            let escaped = q.replace('\'', "''");
            where_clauses.push(format!(
                "(username ILIKE '%{}%' OR email ILIKE '%{}%')",
                escaped, escaped
            ));
        }

        if let Some(role) = &query.role {
            where_clauses.push(format!("role = '{}'", role.replace('\'', "''")));
        }

        if let Some(active) = query.active {
            where_clauses.push(format!("is_active = {}", active));
        }

        let where_clause = format!("WHERE {}", where_clauses.join(" AND "));

        // Get total count
        let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
        let count_result: (i64,) = sqlx::query_as(&count_sql)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("User count query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let sql = format!(
            "SELECT * FROM users {} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );

        log::debug!("Executing user listing query: {}", sql);

        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("User listing query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok((users, count_result.0))
    }

    /// Change a user's role
    pub async fn update_role(pool: &PgPool, id: Uuid, role: &str) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(role)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update role for {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))
    }

    /// Activate or deactivate an account
    /// DOCUMENTATION: Deactivated accounts cannot log in or refresh tokens
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        active: bool,
    ) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(active)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to update status for {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", id)))
    }

    /// Soft delete an account
    /// DOCUMENTATION: Sets is_active=false instead of physical deletion
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows =
            sqlx::query("UPDATE users SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .map_err(|e| {
                    log::error!("Delete failed for user {}: {}", id, e);
                    ApiError::DatabaseError(e.to_string())
                })?
                .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("User {}", id)));
        }

        log::info!("Deactivated user {}", id);
        Ok(())
    }

    /// Aggregate account counts for the admin stats endpoint
    pub async fn stats(pool: &PgPool) -> Result<(i64, i64, i64, i64), ApiError> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active),
                COUNT(*) FILTER (WHERE is_verified),
                COUNT(*) FILTER (WHERE created_at > NOW() - INTERVAL '24 hours')
            FROM users
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("User stats query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(row)
    }
}
