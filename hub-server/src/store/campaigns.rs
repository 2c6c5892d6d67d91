//! Content reward campaign storage

use chrono::{DateTime, Utc};
use hub_common::models::{
    CampaignAsset, CampaignStatus, ContentRewardCampaign, Platform,
};
use hub_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields accepted when creating or updating a campaign
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInput {
    pub title: String,
    pub payout_rate: f64,
    pub total_budget: f64,
    pub minimum_payout: f64,
    pub maximum_payout: f64,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub assets: Vec<CampaignAsset>,
    /// New campaigns always start Active; on update, omitting this keeps
    /// the stored status
    pub status: Option<CampaignStatus>,
}

impl CampaignInput {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("campaign title must not be empty".to_string()));
        }
        if self.payout_rate <= 0.0 {
            return Err(Error::Validation("payout rate must be positive".to_string()));
        }
        if self.total_budget <= 0.0 {
            return Err(Error::Validation("total budget must be positive".to_string()));
        }
        if self.minimum_payout < 0.0 {
            return Err(Error::Validation("minimum payout must not be negative".to_string()));
        }
        if self.maximum_payout < self.minimum_payout {
            return Err(Error::Validation(
                "maximum payout must be at least the minimum payout".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: String,
    title: String,
    payout_rate: f64,
    total_budget: f64,
    total_paid_out: f64,
    participant_count: i64,
    total_views: i64,
    minimum_payout: f64,
    maximum_payout: f64,
    platforms: String,
    status: String,
    requirements: String,
    assets: String,
    created_at: DateTime<Utc>,
}

impl CampaignRow {
    fn into_model(self) -> Result<ContentRewardCampaign> {
        Ok(ContentRewardCampaign {
            id: self.id,
            title: self.title,
            payout_rate: self.payout_rate,
            total_budget: self.total_budget,
            total_paid_out: self.total_paid_out,
            participant_count: self.participant_count,
            total_views: self.total_views,
            minimum_payout: self.minimum_payout,
            maximum_payout: self.maximum_payout,
            platforms: parse_json(&self.platforms, "platforms")?,
            status: CampaignStatus::parse(&self.status)?,
            requirements: parse_json(&self.requirements, "requirements")?,
            assets: parse_json(&self.assets, "assets")?,
            created_at: self.created_at,
        })
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str, field: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("corrupt campaign {} column: {}", field, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(format!("serialize: {}", e)))
}

const SELECT_CAMPAIGN: &str = "SELECT id, title, payout_rate, total_budget, total_paid_out, \
     participant_count, total_views, minimum_payout, maximum_payout, platforms, status, \
     requirements, assets, created_at FROM reward_campaigns";

/// Fetch one campaign by id
pub async fn get_campaign(pool: &SqlitePool, id: &str) -> Result<ContentRewardCampaign> {
    let row: Option<CampaignRow> =
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_CAMPAIGN))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| Error::NotFound(format!("campaign {}", id)))?
        .into_model()
}

/// Fetch all campaigns (admin view)
pub async fn list_campaigns(pool: &SqlitePool) -> Result<Vec<ContentRewardCampaign>> {
    let rows: Vec<CampaignRow> =
        sqlx::query_as(&format!("{} ORDER BY created_at DESC, id ASC", SELECT_CAMPAIGN))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(CampaignRow::into_model).collect()
}

/// Fetch Active campaigns only (affiliate view)
pub async fn list_active_campaigns(pool: &SqlitePool) -> Result<Vec<ContentRewardCampaign>> {
    let rows: Vec<CampaignRow> =
        sqlx::query_as(&format!("{} WHERE status = 'Active'", SELECT_CAMPAIGN))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(CampaignRow::into_model).collect()
}

/// Create a new campaign (always starts Active with zeroed aggregates)
pub async fn create_campaign(
    pool: &SqlitePool,
    input: CampaignInput,
) -> Result<ContentRewardCampaign> {
    input.validate()?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO reward_campaigns (id, title, payout_rate, total_budget, minimum_payout, \
         maximum_payout, platforms, status, requirements, assets, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'Active', ?, ?, ?)",
    )
    .bind(&id)
    .bind(input.title.trim())
    .bind(input.payout_rate)
    .bind(input.total_budget)
    .bind(input.minimum_payout)
    .bind(input.maximum_payout)
    .bind(to_json(&input.platforms)?)
    .bind(to_json(&input.requirements)?)
    .bind(to_json(&input.assets)?)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_campaign(pool, &id).await
}

/// Update campaign fields (aggregates are never written here)
pub async fn update_campaign(
    pool: &SqlitePool,
    id: &str,
    input: CampaignInput,
) -> Result<ContentRewardCampaign> {
    input.validate()?;

    // An omitted status keeps the stored one, so an edit can never quietly
    // revive an Ended campaign
    let result = sqlx::query(
        "UPDATE reward_campaigns SET title = ?, payout_rate = ?, total_budget = ?, \
         minimum_payout = ?, maximum_payout = ?, platforms = ?, \
         status = COALESCE(?, status), requirements = ?, assets = ? WHERE id = ?",
    )
    .bind(input.title.trim())
    .bind(input.payout_rate)
    .bind(input.total_budget)
    .bind(input.minimum_payout)
    .bind(input.maximum_payout)
    .bind(to_json(&input.platforms)?)
    .bind(input.status.map(|s| s.as_str()))
    .bind(to_json(&input.requirements)?)
    .bind(to_json(&input.assets)?)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("campaign {}", id)));
    }

    get_campaign(pool, id).await
}

/// Recompute campaign aggregates from the submission set
///
/// Idempotent recovery path: total_paid_out and total_views come from Paid
/// submissions, participant_count from distinct affiliates across all
/// submissions. Overwrites whatever the counters currently hold.
pub async fn rebuild_campaign_totals(
    pool: &SqlitePool,
    id: &str,
) -> Result<ContentRewardCampaign> {
    let mut tx = pool.begin().await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reward_campaigns WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if !exists {
        return Err(Error::NotFound(format!("campaign {}", id)));
    }

    let (paid_out, views): (Option<f64>, Option<i64>) = sqlx::query_as(
        "SELECT SUM(calculated_earnings), SUM(final_view_count) \
         FROM submissions WHERE campaign_id = ? AND status = 'Paid'",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    let participants: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT affiliate_id) FROM submissions WHERE campaign_id = ?",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE reward_campaigns SET total_paid_out = ?, total_views = ?, participant_count = ? \
         WHERE id = ?",
    )
    .bind(paid_out.unwrap_or(0.0))
    .bind(views.unwrap_or(0))
    .bind(participants)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_campaign(pool, id).await
}
