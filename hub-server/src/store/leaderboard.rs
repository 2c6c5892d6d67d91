//! Leaderboard storage
//!
//! One published snapshot per timeframe; publishing replaces the previous
//! snapshot for that timeframe.

use chrono::{DateTime, Utc};
use hub_common::models::{Leaderboard, LeaderboardEntry};
use hub_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;

/// Payload for publishing a leaderboard snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardInput {
    pub timeframe: String,
    pub top_affiliates: Vec<LeaderboardEntry>,
}

/// Fetch the published snapshot for a timeframe
pub async fn get_leaderboard(pool: &SqlitePool, timeframe: &str) -> Result<Leaderboard> {
    let row: Option<(DateTime<Utc>, String)> =
        sqlx::query_as("SELECT date, entries FROM leaderboards WHERE timeframe = ?")
            .bind(timeframe)
            .fetch_optional(pool)
            .await?;

    let (date, entries) =
        row.ok_or_else(|| Error::NotFound(format!("leaderboard for {}", timeframe)))?;

    Ok(Leaderboard {
        date,
        timeframe: timeframe.to_string(),
        top_affiliates: serde_json::from_str(&entries)
            .map_err(|e| Error::Internal(format!("corrupt leaderboard entries: {}", e)))?,
    })
}

/// Publish (replace) the snapshot for a timeframe
///
/// Entries are re-ranked by total GMV descending before storage so the
/// published ranks are always consistent with the figures.
pub async fn publish_leaderboard(
    pool: &SqlitePool,
    input: LeaderboardInput,
) -> Result<Leaderboard> {
    if input.timeframe.trim().is_empty() {
        return Err(Error::Validation("timeframe must not be empty".to_string()));
    }

    let mut entries = input.top_affiliates;
    entries.sort_by(|a, b| {
        b.total_gmv
            .partial_cmp(&a.total_gmv)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tiktok_username.cmp(&b.tiktok_username))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as i64;
    }

    let timeframe = input.timeframe.trim().to_string();
    let entries_json = serde_json::to_string(&entries)
        .map_err(|e| Error::Internal(format!("serialize: {}", e)))?;

    sqlx::query(
        "INSERT INTO leaderboards (timeframe, date, entries) VALUES (?, ?, ?) \
         ON CONFLICT(timeframe) DO UPDATE SET date = excluded.date, entries = excluded.entries",
    )
    .bind(&timeframe)
    .bind(Utc::now())
    .bind(&entries_json)
    .execute(pool)
    .await?;

    get_leaderboard(pool, &timeframe).await
}
