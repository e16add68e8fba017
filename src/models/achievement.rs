// src/models/achievement.rs
// DOCUMENTATION: Achievements, streaks, dashboard and leaderboard DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An achievement earned by a user
/// DOCUMENTATION: Maps directly to the achievements table
/// The catalog of codes is fixed in services::streak_service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Stable code, e.g. "streak_7"
    pub code: String,

    pub earned_at: DateTime<Utc>,
}

/// Earned achievement hydrated with its display metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AchievementView {
    pub code: String,
    pub title: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

/// Per-user meditation statistics for the dashboard
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub total_sessions: i64,
    pub total_minutes: i64,
    pub current_streak_days: i64,
    pub longest_streak_days: i64,
    pub achievements: Vec<AchievementView>,
}

/// One leaderboard row
#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardRow {
    #[sqlx(default)]
    pub rank: i64,
    pub user_id: Uuid,
    pub username: String,
    pub total_minutes: i64,
    pub total_sessions: i64,
    #[sqlx(default)]
    pub current_streak_days: i64,
}

/// Leaderboard response, optionally carrying the caller's own rank
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub period: String,
    pub data: Vec<LeaderboardRow>,
    /// Present when the request carried a bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me: Option<LeaderboardRow>,
}

/// Query parameters for GET /api/leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// week, month or all (default all)
    pub period: Option<String>,
    pub limit: Option<i64>,
}

/// Response for recording a session: the record plus any new achievements
#[derive(Debug, Serialize)]
pub struct RecordSessionResponse {
    pub session: crate::models::MeditationSession,
    pub current_streak_days: i64,
    pub new_achievements: Vec<AchievementView>,
}
