// src/db/otp_repository.rs
// DOCUMENTATION: One-time verification code storage
// PURPOSE: Issue and consume single-use OTP rows for signup and password reset

use crate::errors::ApiError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct OtpRepository;

impl OtpRepository {
    /// Store a freshly generated code, invalidating earlier unconsumed ones
    /// DOCUMENTATION: Only the most recent code per (user, purpose) is valid
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        code: &str,
        purpose: &str,
        ttl_minutes: i64,
    ) -> Result<(), ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            "DELETE FROM otp_codes WHERE user_id = $1 AND purpose = $2 AND consumed_at IS NULL",
        )
        .bind(user_id)
        .bind(purpose)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to clear stale codes for {}: {}", user_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO otp_codes (user_id, code, purpose, expires_at, created_at)
            VALUES ($1, $2, $3, NOW() + ($4 || ' minutes')::interval, NOW())
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .bind(ttl_minutes.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to issue code for {}: {}", user_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit code issue: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Consume a code if it matches, is unexpired and unused
    /// Returns false when no such code exists
    pub async fn consume(
        pool: &PgPool,
        user_id: Uuid,
        code: &str,
        purpose: &str,
    ) -> Result<bool, ApiError> {
        let rows = sqlx::query(
            r#"
            UPDATE otp_codes
            SET consumed_at = NOW()
            WHERE user_id = $1
              AND code = $2
              AND purpose = $3
              AND consumed_at IS NULL
              AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(purpose)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to consume code for {}: {}", user_id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        Ok(rows == 1)
    }
}
