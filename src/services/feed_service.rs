// src/services/feed_service.rs
// DOCUMENTATION: Business logic for the community feed
// PURPOSE: Intermediary between handlers and repository, handles extra logic

use crate::db::{StoryRepository, UserRepository};
use crate::errors::ApiError;
use crate::models::{
    Comment, CommentListResponse, CreateCommentRequest, CreateStoryRequest, FeedQuery,
    FeedResponse, StoryDetailResponse, StoryFeedRow, TrendingHashtag,
};
use crate::services::text_parser::{extract_hashtags, extract_mentions};
use crate::services::ProfileCache;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FeedService;

impl FeedService {
    /// Create a story, extracting hashtags and resolving @mentions
    /// Unknown mentioned usernames are dropped silently
    pub async fn create_story(
        pool: &PgPool,
        cache: &ProfileCache,
        author_id: Uuid,
        req: CreateStoryRequest,
    ) -> Result<StoryFeedRow, ApiError> {
        let hashtags = extract_hashtags(&req.body);
        let mentioned = extract_mentions(&req.body);

        let mut mention_ids = Vec::new();
        for username in &mentioned {
            if let Some(profile) = Self::resolve_username(pool, cache, username).await? {
                // A user mentioning themselves is not a mention worth storing
                if profile.id != author_id {
                    mention_ids.push(profile.id);
                }
            }
        }

        let story =
            StoryRepository::create_story(pool, author_id, &req.body, &hashtags, &mention_ids)
                .await?;

        StoryRepository::get_feed_row(pool, story.id, Some(author_id)).await
    }

    /// Resolve a username through the profile cache, falling back to the database
    async fn resolve_username(
        pool: &PgPool,
        cache: &ProfileCache,
        username: &str,
    ) -> Result<Option<crate::models::PublicUser>, ApiError> {
        if let Some(profile) = cache.get(username).await {
            return Ok(Some(profile));
        }

        match UserRepository::find_by_username(pool, username).await? {
            Some(user) if user.is_active => {
                let profile = user.to_public();
                cache.set(profile.clone()).await;
                Ok(Some(profile))
            }
            _ => Ok(None),
        }
    }

    /// Paginated feed
    pub async fn feed(
        pool: &PgPool,
        query: FeedQuery,
        viewer: Option<Uuid>,
    ) -> Result<FeedResponse, ApiError> {
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let page = query.page.unwrap_or(1).max(1);

        let (stories, total_count) = StoryRepository::feed(pool, &query, viewer).await?;
        let has_more = total_count > page * limit;

        Ok(FeedResponse {
            data: stories,
            total_count,
            page,
            limit,
            has_more,
        })
    }

    /// One story with its comments
    pub async fn story_detail(
        pool: &PgPool,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<StoryDetailResponse, ApiError> {
        let story = StoryRepository::get_feed_row(pool, id, viewer).await?;
        let (comments, _) = StoryRepository::comments(pool, id, 1, 100).await?;

        Ok(StoryDetailResponse { story, comments })
    }

    /// Delete a story; only the author or an admin may do this
    pub async fn delete_story(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), ApiError> {
        let story = StoryRepository::get_story(pool, id).await?;
        if story.author_id != user_id && !is_admin {
            return Err(ApiError::Forbidden);
        }
        StoryRepository::soft_delete_story(pool, id).await
    }

    /// Like a story; returns the refreshed row
    pub async fn like_story(
        pool: &PgPool,
        story_id: Uuid,
        user_id: Uuid,
    ) -> Result<StoryFeedRow, ApiError> {
        // 404 before touching the like table
        let _ = StoryRepository::get_story(pool, story_id).await?;
        StoryRepository::like(pool, story_id, user_id).await?;
        StoryRepository::get_feed_row(pool, story_id, Some(user_id)).await
    }

    /// Remove a like; returns the refreshed row
    pub async fn unlike_story(
        pool: &PgPool,
        story_id: Uuid,
        user_id: Uuid,
    ) -> Result<StoryFeedRow, ApiError> {
        let _ = StoryRepository::get_story(pool, story_id).await?;
        StoryRepository::unlike(pool, story_id, user_id).await?;
        StoryRepository::get_feed_row(pool, story_id, Some(user_id)).await
    }

    /// Comment on a story
    pub async fn create_comment(
        pool: &PgPool,
        story_id: Uuid,
        author_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        let _ = StoryRepository::get_story(pool, story_id).await?;
        StoryRepository::create_comment(pool, story_id, author_id, &req.body).await
    }

    /// Paginated comments for a story
    pub async fn comments(
        pool: &PgPool,
        story_id: Uuid,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<CommentListResponse, ApiError> {
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let page = page.unwrap_or(1).max(1);

        let _ = StoryRepository::get_story(pool, story_id).await?;
        let (comments, total_count) = StoryRepository::comments(pool, story_id, page, limit).await?;
        let has_more = total_count > page * limit;

        Ok(CommentListResponse {
            data: comments,
            total_count,
            page,
            limit,
            has_more,
        })
    }

    /// Delete a comment; only the author or an admin may do this
    pub async fn delete_comment(
        pool: &PgPool,
        comment_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), ApiError> {
        let comment = StoryRepository::get_comment(pool, comment_id).await?;
        if comment.author_id != user_id && !is_admin {
            return Err(ApiError::Forbidden);
        }
        StoryRepository::soft_delete_comment(pool, &comment).await
    }

    /// Trending hashtags over the last week
    pub async fn trending_hashtags(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<TrendingHashtag>, ApiError> {
        let limit = limit.unwrap_or(10).clamp(1, 50);
        StoryRepository::trending_hashtags(pool, limit).await
    }
}
