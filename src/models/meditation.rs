// src/models/meditation.rs
// DOCUMENTATION: Core data structures for the meditation catalog and sessions
// PURPOSE: Defines serialization/deserialization models for API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A guided meditation type from the catalog
/// DOCUMENTATION: Maps directly to the meditation_types table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeditationType {
    /// Unique identifier (UUID v4)
    pub id: Uuid,

    /// Display name, e.g. "Body Scan"
    pub name: String,

    /// URL-friendly unique identifier, e.g. "body-scan"
    pub slug: String,

    /// Optional detailed description
    pub description: Option<String>,

    /// Category: breathing, mindfulness, sleep, movement, ...
    pub category: String,

    /// Difficulty: beginner, intermediate, advanced
    pub difficulty: String,

    /// Suggested session length in minutes
    pub default_duration_minutes: i32,

    /// Optional guided audio track URL
    pub audio_url: Option<String>,

    /// Soft delete flag (true = active)
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a catalog entry (admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeditationTypeRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(length(min = 1, max = 120))]
    pub slug: String,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 60))]
    pub category: String,

    /// beginner, intermediate or advanced
    pub difficulty: String,

    #[validate(range(min = 1, max = 480))]
    pub default_duration_minutes: i32,

    pub audio_url: Option<String>,
}

/// Request DTO for updating a catalog entry (admin)
/// Partial update - only provided fields are modified
#[derive(Debug, Deserialize)]
pub struct UpdateMeditationTypeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub default_duration_minutes: Option<i32>,
    pub audio_url: Option<String>,
}

/// Query parameters for the catalog listing
#[derive(Debug, Deserialize)]
pub struct TypeListQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

/// A completed meditation session
/// DOCUMENTATION: Maps directly to the meditation_sessions table
/// The SPA timer owns elapsed/pause bookkeeping; the API records the result
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeditationSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub type_id: Uuid,

    /// Final session length in seconds
    pub duration_seconds: i32,

    /// Optional free-form reflection notes
    pub notes: Option<String>,

    /// When the session finished (client-reported finish defaults to now)
    pub completed_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

/// Request DTO for recording a completed session
#[derive(Debug, Deserialize, Validate)]
pub struct RecordSessionRequest {
    pub type_id: Uuid,

    /// 1 second up to 24 hours
    #[validate(range(min = 1, max = 86400))]
    pub duration_seconds: i32,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Session history row hydrated with catalog info
#[derive(Debug, Serialize, FromRow)]
pub struct SessionHistoryRow {
    pub id: Uuid,
    pub type_id: Uuid,
    pub type_name: String,
    pub duration_seconds: i32,
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Paginated session history
#[derive(Debug, Serialize)]
pub struct SessionHistoryResponse {
    pub data: Vec<SessionHistoryRow>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Query parameters for session history
#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
