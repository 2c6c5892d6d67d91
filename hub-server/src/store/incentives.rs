//! Incentive campaign storage

use chrono::{DateTime, Utc};
use hub_common::models::{IncentiveCampaign, IncentiveStatus};
use hub_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields accepted when creating an incentive campaign
#[derive(Debug, Clone, Deserialize)]
pub struct IncentiveInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub rewards: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub min_affiliates: i64,
}

#[derive(sqlx::FromRow)]
struct IncentiveRow {
    id: String,
    title: String,
    description: String,
    rules: String,
    rewards: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    min_affiliates: i64,
    joined_affiliates: i64,
    status: String,
}

impl IncentiveRow {
    fn into_model(self) -> Result<IncentiveCampaign> {
        Ok(IncentiveCampaign {
            id: self.id,
            title: self.title,
            description: self.description,
            rules: serde_json::from_str(&self.rules)
                .map_err(|e| Error::Internal(format!("corrupt incentive rules column: {}", e)))?,
            rewards: self.rewards,
            start_date: self.start_date,
            end_date: self.end_date,
            min_affiliates: self.min_affiliates,
            joined_affiliates: self.joined_affiliates,
            status: IncentiveStatus::parse(&self.status)?,
        })
    }
}

const SELECT_INCENTIVE: &str = "SELECT id, title, description, rules, rewards, start_date, \
     end_date, min_affiliates, joined_affiliates, status FROM incentives";

/// Fetch one incentive campaign by id
pub async fn get_incentive(pool: &SqlitePool, id: &str) -> Result<IncentiveCampaign> {
    let row: Option<IncentiveRow> =
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_INCENTIVE))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| Error::NotFound(format!("incentive {}", id)))?
        .into_model()
}

/// List incentive campaigns, soonest-starting first
pub async fn list_incentives(pool: &SqlitePool) -> Result<Vec<IncentiveCampaign>> {
    let rows: Vec<IncentiveRow> =
        sqlx::query_as(&format!("{} ORDER BY start_date DESC, id ASC", SELECT_INCENTIVE))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(IncentiveRow::into_model).collect()
}

/// Create an incentive campaign (starts Pending until enough affiliates join)
pub async fn create_incentive(
    pool: &SqlitePool,
    input: IncentiveInput,
) -> Result<IncentiveCampaign> {
    if input.title.trim().is_empty() {
        return Err(Error::Validation("incentive title must not be empty".to_string()));
    }
    if input.end_date <= input.start_date {
        return Err(Error::Validation("end date must be after start date".to_string()));
    }
    if input.min_affiliates < 0 {
        return Err(Error::Validation("minimum affiliates must not be negative".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO incentives (id, title, description, rules, rewards, start_date, end_date, \
         min_affiliates, joined_affiliates, status) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 'Pending')",
    )
    .bind(&id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(
        serde_json::to_string(&input.rules)
            .map_err(|e| Error::Internal(format!("serialize: {}", e)))?,
    )
    .bind(&input.rewards)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.min_affiliates)
    .execute(pool)
    .await?;

    get_incentive(pool, &id).await
}

/// Join an affiliate to an incentive campaign
///
/// Idempotent per affiliate: the participant row's composite key makes a
/// repeat join a no-op, and joined_affiliates only increments on first join.
/// When the count reaches min_affiliates a Pending campaign flips Active.
pub async fn join_incentive(
    pool: &SqlitePool,
    id: &str,
    affiliate_id: &str,
) -> Result<IncentiveCampaign> {
    let mut tx = pool.begin().await?;

    let status: Option<String> = sqlx::query_scalar("SELECT status FROM incentives WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    match status.as_deref() {
        None => return Err(Error::NotFound(format!("incentive {}", id))),
        Some("Ended") => {
            return Err(Error::Validation("incentive campaign has ended".to_string()))
        }
        Some(_) => {}
    }

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO incentive_participants (incentive_id, affiliate_id, joined_at) \
         VALUES (?, ?, ?)",
    )
    .bind(id)
    .bind(affiliate_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 1 {
        sqlx::query(
            "UPDATE incentives SET joined_affiliates = joined_affiliates + 1 WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Enough participants activates a pending campaign
        sqlx::query(
            "UPDATE incentives SET status = 'Active' \
             WHERE id = ? AND status = 'Pending' AND joined_affiliates >= min_affiliates",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    get_incentive(pool, id).await
}
