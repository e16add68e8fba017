// src/db/story_repository.rs
// DOCUMENTATION: Community feed database operations
// PURPOSE: Stories, comments and likes with transactional counter maintenance

use crate::errors::ApiError;
use crate::models::{
    Comment, CommentRow, FeedQuery, Story, StoryFeedRow, TrendingHashtag,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoryRepository;

impl StoryRepository {
    /// Insert a new story with pre-extracted hashtags and mentions
    pub async fn create_story(
        pool: &PgPool,
        author_id: Uuid,
        body: &str,
        hashtags: &[String],
        mentions: &[Uuid],
    ) -> Result<Story, ApiError> {
        let story = sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO stories (author_id, body, hashtags, mentions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(author_id)
        .bind(body)
        .bind(hashtags)
        .bind(mentions)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create story: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Created story {} by {}", story.id, author_id);
        Ok(story)
    }

    /// Feed listing with filters, hydrated with author handle and viewer like state
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn feed(
        pool: &PgPool,
        query: &FeedQuery,
        viewer: Option<Uuid>,
    ) -> Result<(Vec<StoryFeedRow>, i64), ApiError> {
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1) * limit;

        // Build dynamic query based on provided filters
        let mut where_clauses =
            vec!["s.is_active = true".to_string(), "u.is_active = true".to_string()];

        if let Some(hashtag) = &query.hashtag {
            where_clauses.push(format!(
                "'{}' = ANY(s.hashtags)",
                hashtag.to_lowercase().replace('\'', "''")
            ));
        }

        if let Some(author) = query.author {
            where_clauses.push(format!("s.author_id = '{}'", author));
        }

        let where_clause = format!("WHERE {}", where_clauses.join(" AND "));

        let count_sql = format!(
            "SELECT COUNT(*) FROM stories s JOIN users u ON u.id = s.author_id {}",
            where_clause
        );
        let count_result: (i64,) = sqlx::query_as(&count_sql)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Feed count query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        // A NULL viewer never matches any like row, so `liked` is false for anonymous reads
        let sql = format!(
            r#"
            SELECT s.id, s.author_id, u.username AS author_username,
                   s.body, s.hashtags, s.mentions, s.like_count, s.comment_count,
                   EXISTS(
                       SELECT 1 FROM story_likes l
                       WHERE l.story_id = s.id AND l.user_id = $1
                   ) AS liked,
                   s.created_at
            FROM stories s
            JOIN users u ON u.id = s.author_id
            {}
            ORDER BY s.created_at DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, limit, offset
        );

        let rows = sqlx::query_as::<_, StoryFeedRow>(&sql)
            .bind(viewer)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Feed query error: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok((rows, count_result.0))
    }

    /// One hydrated story row
    pub async fn get_feed_row(
        pool: &PgPool,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<StoryFeedRow, ApiError> {
        sqlx::query_as::<_, StoryFeedRow>(
            r#"
            SELECT s.id, s.author_id, u.username AS author_username,
                   s.body, s.hashtags, s.mentions, s.like_count, s.comment_count,
                   EXISTS(
                       SELECT 1 FROM story_likes l
                       WHERE l.story_id = s.id AND l.user_id = $2
                   ) AS liked,
                   s.created_at
            FROM stories s
            JOIN users u ON u.id = s.author_id
            WHERE s.id = $1 AND s.is_active = true
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching story {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Story {}", id)))
    }

    /// Raw story row, used for ownership checks
    pub async fn get_story(pool: &PgPool, id: Uuid) -> Result<Story, ApiError> {
        sqlx::query_as::<_, Story>("SELECT * FROM stories WHERE id = $1 AND is_active = true")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching story {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound(format!("Story {}", id)))
    }

    /// Soft delete a story
    pub async fn soft_delete_story(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let rows =
            sqlx::query("UPDATE stories SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .map_err(|e| {
                    log::error!("Delete failed for story {}: {}", id, e);
                    ApiError::DatabaseError(e.to_string())
                })?
                .rows_affected();

        if rows == 0 {
            return Err(ApiError::NotFound(format!("Story {}", id)));
        }

        log::info!("Deleted story {}", id);
        Ok(())
    }

    /// Like a story
    /// DOCUMENTATION: Idempotent - the like row and the denormalized counter
    /// move together in one transaction; returns false when already liked
    pub async fn like(pool: &PgPool, story_id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO story_likes (story_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (story_id, user_id) DO NOTHING
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to like story {}: {}", story_id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if inserted == 1 {
            sqlx::query("UPDATE stories SET like_count = like_count + 1 WHERE id = $1")
                .bind(story_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    log::error!("Failed to bump like count for {}: {}", story_id, e);
                    ApiError::DatabaseError(e.to_string())
                })?;
        }

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit like transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(inserted == 1)
    }

    /// Remove a like, decrementing the counter when a row was actually removed
    pub async fn unlike(pool: &PgPool, story_id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let removed = sqlx::query("DELETE FROM story_likes WHERE story_id = $1 AND user_id = $2")
            .bind(story_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to unlike story {}: {}", story_id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .rows_affected();

        if removed == 1 {
            sqlx::query(
                "UPDATE stories SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1",
            )
            .bind(story_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to drop like count for {}: {}", story_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit unlike transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(removed == 1)
    }

    /// Insert a comment and bump the story counter in one transaction
    pub async fn create_comment(
        pool: &PgPool,
        story_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO story_comments (story_id, author_id, body, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(story_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to create comment on {}: {}", story_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        sqlx::query("UPDATE stories SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(story_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to bump comment count for {}: {}", story_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit comment transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(comment)
    }

    /// Comments for a story, oldest first
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn comments(
        pool: &PgPool,
        story_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<CommentRow>, i64), ApiError> {
        let offset = (page - 1) * limit;

        let count_result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM story_comments WHERE story_id = $1 AND is_active = true",
        )
        .bind(story_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Comment count query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.story_id, c.author_id, u.username AS author_username,
                   c.body, c.created_at
            FROM story_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.story_id = $1 AND c.is_active = true
            ORDER BY c.created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(story_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Comment listing query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok((rows, count_result.0))
    }

    /// Raw comment row, used for ownership checks
    pub async fn get_comment(pool: &PgPool, id: Uuid) -> Result<Comment, ApiError> {
        sqlx::query_as::<_, Comment>(
            "SELECT * FROM story_comments WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching comment {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {}", id)))
    }

    /// Soft delete a comment, dropping the story counter with it
    pub async fn soft_delete_comment(
        pool: &PgPool,
        comment: &Comment,
    ) -> Result<(), ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let rows = sqlx::query(
            "UPDATE story_comments SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(comment.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Delete failed for comment {}: {}", comment.id, e);
            ApiError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if rows == 1 {
            sqlx::query(
                "UPDATE stories SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1",
            )
            .bind(comment.story_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to drop comment count: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit comment delete: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Deleted comment {}", comment.id);
        Ok(())
    }

    /// Hashtags ranked by use over the last 7 days
    pub async fn trending_hashtags(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TrendingHashtag>, ApiError> {
        sqlx::query_as::<_, TrendingHashtag>(
            r#"
            SELECT h AS hashtag, COUNT(*)::bigint AS use_count
            FROM stories s, UNNEST(s.hashtags) AS h
            WHERE s.is_active = true
              AND s.created_at > NOW() - INTERVAL '7 days'
            GROUP BY h
            ORDER BY use_count DESC, h ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Trending hashtags query error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Total active stories, for admin stats
    pub async fn count_stories(pool: &PgPool) -> Result<i64, ApiError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM stories WHERE is_active = true")
                .fetch_one(pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }
}
