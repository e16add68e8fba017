// src/services/streak_service.rs
// DOCUMENTATION: Streak computation, achievement awarding and leaderboard assembly
// PURPOSE: Business logic between the session handlers and the repository

use crate::db::MeditationRepository;
use crate::errors::ApiError;
use crate::models::{
    Achievement, AchievementView, LeaderboardQuery, LeaderboardResponse, RecordSessionRequest,
    RecordSessionResponse, UserStatsResponse,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// One entry of the fixed achievement catalog
pub struct AchievementDef {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Fixed achievement catalog
/// Codes are stored in the database; titles/descriptions are presentation-only
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        code: "first_session",
        title: "First Steps",
        description: "Complete your first meditation session",
    },
    AchievementDef {
        code: "ten_sessions",
        title: "Finding Rhythm",
        description: "Complete 10 meditation sessions",
    },
    AchievementDef {
        code: "fifty_sessions",
        title: "Dedicated Practitioner",
        description: "Complete 50 meditation sessions",
    },
    AchievementDef {
        code: "hundred_sessions",
        title: "Centurion of Calm",
        description: "Complete 100 meditation sessions",
    },
    AchievementDef {
        code: "streak_3",
        title: "Three in a Row",
        description: "Meditate 3 days in a row",
    },
    AchievementDef {
        code: "streak_7",
        title: "One Full Week",
        description: "Meditate 7 days in a row",
    },
    AchievementDef {
        code: "streak_30",
        title: "Monthly Devotion",
        description: "Meditate 30 days in a row",
    },
    AchievementDef {
        code: "minutes_60",
        title: "First Hour",
        description: "Accumulate 60 minutes of meditation",
    },
    AchievementDef {
        code: "minutes_600",
        title: "Ten Hours Deep",
        description: "Accumulate 600 minutes of meditation",
    },
    AchievementDef {
        code: "minutes_3000",
        title: "Fifty Hours Still",
        description: "Accumulate 3000 minutes of meditation",
    },
];

/// Current streak in days over a distinct, descending date list
///
/// The streak is alive while its most recent day is today or yesterday;
/// a full missed calendar day breaks it.
pub fn current_streak(dates_desc: &[NaiveDate], today: NaiveDate) -> i64 {
    let first = match dates_desc.first() {
        Some(d) => *d,
        None => return 0,
    };

    if today - first > Duration::days(1) {
        return 0;
    }

    consecutive_run(dates_desc, 0)
}

/// Longest streak anywhere in the history
pub fn longest_streak(dates_desc: &[NaiveDate]) -> i64 {
    let mut best = 0;
    let mut idx = 0;
    while idx < dates_desc.len() {
        let run = consecutive_run(dates_desc, idx);
        best = best.max(run);
        idx += run as usize;
    }
    best
}

/// Length of the consecutive-day run starting at `start`
fn consecutive_run(dates_desc: &[NaiveDate], start: usize) -> i64 {
    let mut run = 1;
    for pair in dates_desc[start..].windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            break;
        }
    }
    run
}

/// Achievement codes a user qualifies for, given their aggregates
pub fn qualified_codes(
    total_sessions: i64,
    total_minutes: i64,
    current_streak_days: i64,
) -> Vec<&'static str> {
    let mut codes = Vec::new();

    if total_sessions >= 1 {
        codes.push("first_session");
    }
    if total_sessions >= 10 {
        codes.push("ten_sessions");
    }
    if total_sessions >= 50 {
        codes.push("fifty_sessions");
    }
    if total_sessions >= 100 {
        codes.push("hundred_sessions");
    }
    if current_streak_days >= 3 {
        codes.push("streak_3");
    }
    if current_streak_days >= 7 {
        codes.push("streak_7");
    }
    if current_streak_days >= 30 {
        codes.push("streak_30");
    }
    if total_minutes >= 60 {
        codes.push("minutes_60");
    }
    if total_minutes >= 600 {
        codes.push("minutes_600");
    }
    if total_minutes >= 3000 {
        codes.push("minutes_3000");
    }

    codes
}

/// Attach display metadata to an earned achievement row
pub fn to_view(achievement: &Achievement) -> AchievementView {
    let def = ACHIEVEMENTS
        .iter()
        .find(|d| d.code == achievement.code);

    AchievementView {
        code: achievement.code.clone(),
        title: def.map(|d| d.title).unwrap_or(achievement.code.as_str()).to_string(),
        description: def.map(|d| d.description).unwrap_or_default().to_string(),
        earned_at: achievement.earned_at,
    }
}

pub struct StreakService;

impl StreakService {
    /// Record a completed session, then recompute streak and award achievements
    pub async fn record_session(
        pool: &PgPool,
        user_id: Uuid,
        req: RecordSessionRequest,
    ) -> Result<RecordSessionResponse, ApiError> {
        // The catalog entry must exist and be active
        let _ = MeditationRepository::get_type_by_id(pool, req.type_id).await?;

        let session = MeditationRepository::insert_session(pool, user_id, &req).await?;

        let dates = MeditationRepository::session_dates(pool, user_id).await?;
        let streak = current_streak(&dates, Utc::now().date_naive());
        let (total_sessions, total_seconds) =
            MeditationRepository::user_totals(pool, user_id).await?;

        let mut new_achievements = Vec::new();
        for code in qualified_codes(total_sessions, total_seconds / 60, streak) {
            if let Some(earned) =
                MeditationRepository::insert_achievement(pool, user_id, code).await?
            {
                log::info!("User {} earned achievement {}", user_id, code);
                new_achievements.push(to_view(&earned));
            }
        }

        Ok(RecordSessionResponse {
            session,
            current_streak_days: streak,
            new_achievements,
        })
    }

    /// Dashboard statistics for one user
    pub async fn user_stats(pool: &PgPool, user_id: Uuid) -> Result<UserStatsResponse, ApiError> {
        let (total_sessions, total_seconds) =
            MeditationRepository::user_totals(pool, user_id).await?;
        let dates = MeditationRepository::session_dates(pool, user_id).await?;
        let achievements = MeditationRepository::list_achievements(pool, user_id).await?;

        Ok(UserStatsResponse {
            total_sessions,
            total_minutes: total_seconds / 60,
            current_streak_days: current_streak(&dates, Utc::now().date_naive()),
            longest_streak_days: longest_streak(&dates),
            achievements: achievements.iter().map(to_view).collect(),
        })
    }

    /// Ranked leaderboard for a period, with the caller's own row when known
    pub async fn leaderboard(
        pool: &PgPool,
        query: &LeaderboardQuery,
        viewer: Option<Uuid>,
    ) -> Result<LeaderboardResponse, ApiError> {
        let period = query.period.as_deref().unwrap_or("all");
        let since = Self::period_start(period)?;
        let limit = query.limit.unwrap_or(20).clamp(1, 50);

        let mut rows = MeditationRepository::leaderboard(pool, since, limit).await?;

        // Streaks are per-user; hydrate the visible rows only
        let today = Utc::now().date_naive();
        for row in rows.iter_mut() {
            let dates = MeditationRepository::session_dates(pool, row.user_id).await?;
            row.current_streak_days = current_streak(&dates, today);
        }

        let me = match viewer {
            Some(user_id) => {
                let mut own = MeditationRepository::user_rank(pool, user_id, since).await?;
                if let Some(row) = own.as_mut() {
                    let dates = MeditationRepository::session_dates(pool, row.user_id).await?;
                    row.current_streak_days = current_streak(&dates, today);
                }
                own
            }
            None => None,
        };

        Ok(LeaderboardResponse {
            period: period.to_string(),
            data: rows,
            me,
        })
    }

    fn period_start(period: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
        match period {
            "week" => Ok(Some(Utc::now() - Duration::days(7))),
            "month" => Ok(Some(Utc::now() - Duration::days(30))),
            "all" => Ok(None),
            other => Err(ApiError::ValidationError(format!(
                "Unknown leaderboard period '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_streak_empty_history() {
        assert_eq!(current_streak(&[], d("2026-08-06")), 0);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_streak_single_session_today() {
        let dates = vec![d("2026-08-06")];
        assert_eq!(current_streak(&dates, d("2026-08-06")), 1);
    }

    #[test]
    fn test_streak_survives_until_yesterday() {
        let dates = vec![d("2026-08-05"), d("2026-08-04")];
        assert_eq!(current_streak(&dates, d("2026-08-06")), 2);
    }

    #[test]
    fn test_streak_broken_by_full_missed_day() {
        let dates = vec![d("2026-08-04"), d("2026-08-03")];
        assert_eq!(current_streak(&dates, d("2026-08-06")), 0);
    }

    #[test]
    fn test_streak_counts_consecutive_run_only() {
        let dates = vec![
            d("2026-08-06"),
            d("2026-08-05"),
            d("2026-08-03"),
            d("2026-08-02"),
            d("2026-08-01"),
        ];
        assert_eq!(current_streak(&dates, d("2026-08-06")), 2);
    }

    #[test]
    fn test_longest_streak_found_in_older_history() {
        let dates = vec![
            d("2026-08-06"),
            d("2026-08-03"),
            d("2026-08-02"),
            d("2026-08-01"),
            d("2026-07-20"),
        ];
        assert_eq!(longest_streak(&dates), 3);
        assert_eq!(current_streak(&dates, d("2026-08-06")), 1);
    }

    #[test]
    fn test_qualified_codes_thresholds() {
        assert!(qualified_codes(0, 0, 0).is_empty());
        assert_eq!(qualified_codes(1, 5, 1), vec!["first_session"]);

        let codes = qualified_codes(10, 60, 3);
        assert!(codes.contains(&"ten_sessions"));
        assert!(codes.contains(&"streak_3"));
        assert!(codes.contains(&"minutes_60"));
        assert!(!codes.contains(&"streak_7"));

        let codes = qualified_codes(150, 5000, 45);
        assert!(codes.contains(&"hundred_sessions"));
        assert!(codes.contains(&"streak_30"));
        assert!(codes.contains(&"minutes_3000"));
    }

    #[test]
    fn test_catalog_covers_every_awardable_code() {
        let codes = qualified_codes(i64::MAX, i64::MAX, i64::MAX);
        for code in codes {
            assert!(
                ACHIEVEMENTS.iter().any(|d| d.code == code),
                "missing catalog entry for {}",
                code
            );
        }
    }
}
