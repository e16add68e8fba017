// src/handlers/chatbot.rs
// DOCUMENTATION: HTTP handlers for the AI chat widget
// PURPOSE: Conversation endpoints with offline/external reply backends

use crate::config::Config;
use crate::errors::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::SendMessageRequest;
use crate::services::{AiCompletionClient, ChatbotService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /api/chatbot/message
/// One chat turn; replies come from the external backend when configured,
/// otherwise from the built-in offline guide
pub async fn send_message(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    req: web::Json<SendMessageRequest>,
) -> Result<impl Responder, ApiError> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err(ApiError::ValidationError(e.to_string()));
    }

    let response = if config.ai_api_key.is_empty() {
        ChatbotService::send_message(pool.get_ref(), None, user.user_id()?, req.into_inner())
            .await?
    } else {
        let client =
            AiCompletionClient::new(config.ai_api_key.clone(), config.ai_api_url.clone());
        ChatbotService::send_message(
            pool.get_ref(),
            Some(&client),
            user.user_id()?,
            req.into_inner(),
        )
        .await?
    };

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/chatbot/conversations
/// Own conversations, most recently active first
pub async fn list_conversations(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, ApiError> {
    let conversations =
        ChatbotService::list_conversations(pool.get_ref(), user.user_id()?).await?;
    Ok(HttpResponse::Ok().json(conversations))
}

/// GET /api/chatbot/conversations/{id}/messages
/// Full message history, oldest first
pub async fn conversation_messages(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let messages =
        ChatbotService::conversation_messages(pool.get_ref(), user.user_id()?, path.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// Configuration for chatbot routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/chatbot")
            .route("/message", web::post().to(send_message))
            .route("/conversations", web::get().to(list_conversations))
            .route(
                "/conversations/{id}/messages",
                web::get().to(conversation_messages),
            ),
    );
}
