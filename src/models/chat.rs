// src/models/chat.rs
// DOCUMENTATION: Conversation and message models for the AI chat widget

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A chat conversation between a user and the meditation guide
/// DOCUMENTATION: Maps directly to the conversations table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Derived from the first user message
    pub title: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message within a conversation
/// DOCUMENTATION: Maps directly to the chat_messages table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,

    /// "user" or "assistant"
    pub role: String,

    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for POST /api/chatbot/message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Omitted on the first message of a new conversation
    pub conversation_id: Option<Uuid>,

    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Response for POST /api/chatbot/message
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub conversation_id: Uuid,
    pub reply: ChatMessage,
}
