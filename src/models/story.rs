// src/models/story.rs
// DOCUMENTATION: Core data structures for the community feed
// PURPOSE: Stories, comments and likes with their request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A community post
/// DOCUMENTATION: Maps directly to the stories table
/// Hashtags and mention targets are denormalized onto the row at creation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: Uuid,
    pub author_id: Uuid,

    /// Post text, up to 2000 characters
    pub body: String,

    /// Lowercased #hashtags extracted from the body
    pub hashtags: Vec<String>,

    /// Resolved @mention user ids
    pub mentions: Vec<Uuid>,

    /// Denormalized counters, maintained transactionally with like/comment rows
    pub like_count: i32,
    pub comment_count: i32,

    /// Soft delete flag (true = active)
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for POST /api/stories
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}

/// Feed row hydrated with the author handle and the caller's like state
#[derive(Debug, Serialize, FromRow)]
pub struct StoryFeedRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub hashtags: Vec<String>,
    pub mentions: Vec<Uuid>,
    pub like_count: i32,
    pub comment_count: i32,
    /// Whether the requesting user liked this story (false when anonymous)
    #[sqlx(default)]
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

/// Paginated feed envelope consumed by the SPA's infinite scroll
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub data: Vec<StoryFeedRow>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Query parameters for GET /api/stories
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Filter to stories carrying this hashtag (without the #)
    pub hashtag: Option<String>,
    /// Filter to stories by this author id
    pub author: Option<Uuid>,
}

/// A comment on a story
/// DOCUMENTATION: Maps directly to the story_comments table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub story_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for commenting on a story
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
}

/// Comment row hydrated with the author handle
#[derive(Debug, Serialize, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub story_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Paginated comment listing
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub data: Vec<CommentRow>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub has_more: bool,
}

/// Query parameters for comment listings
#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Single story detail: the feed row plus its comments
#[derive(Debug, Serialize)]
pub struct StoryDetailResponse {
    pub story: StoryFeedRow,
    pub comments: Vec<CommentRow>,
}

/// A trending hashtag with its recent usage count
#[derive(Debug, Serialize, FromRow)]
pub struct TrendingHashtag {
    pub hashtag: String,
    pub use_count: i64,
}

/// Query parameters for GET /api/hashtags/trending
#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<i64>,
}
