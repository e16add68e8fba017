// src/db/chat_repository.rs
// DOCUMENTATION: Conversation and chat message database operations

use crate::errors::ApiError;
use crate::models::{ChatMessage, Conversation};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ChatRepository;

impl ChatRepository {
    /// Create a conversation titled from the opening message
    pub async fn create_conversation(
        pool: &PgPool,
        user_id: Uuid,
        title: &str,
    ) -> Result<Conversation, ApiError> {
        sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (user_id, title, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create conversation for {}: {}", user_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Retrieve a conversation by ID
    pub async fn get_conversation(pool: &PgPool, id: Uuid) -> Result<Conversation, ApiError> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching conversation {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {}", id)))
    }

    /// A user's conversations, most recently active first
    pub async fn list_conversations(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, ApiError> {
        sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Conversation listing query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Append a message and touch the conversation timestamp
    pub async fn insert_message(
        pool: &PgPool,
        conversation_id: Uuid,
        role: &str,
        body: &str,
    ) -> Result<ChatMessage, ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (conversation_id, role, body, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .bind(role)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to insert message into {}: {}", conversation_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to touch conversation {}: {}", conversation_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit message insert: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(message)
    }

    /// Full message history, oldest first
    pub async fn list_messages(
        pool: &PgPool,
        conversation_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE conversation_id = $1 ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Message listing query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Last N messages, oldest first, for AI completion context
    pub async fn recent_messages(
        pool: &PgPool,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let mut rows = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Recent messages query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        rows.reverse();
        Ok(rows)
    }
}
