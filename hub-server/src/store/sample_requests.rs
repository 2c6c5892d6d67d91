//! Sample campaign and sample request storage

use chrono::{DateTime, Utc};
use hub_common::lifecycle::sample as lifecycle;
use hub_common::models::{SampleCampaign, SampleRequest, SampleRequestStatus};
use hub_common::{Error, Result};
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Fields accepted when creating a sample-product campaign
#[derive(Debug, Clone, Deserialize)]
pub struct SampleCampaignInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub product_url: String,
    pub order_link: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Fields accepted when an affiliate requests a sample
#[derive(Debug, Clone, Deserialize)]
pub struct SampleRequestInput {
    pub campaign_id: String,
    pub video_url: String,
    pub ad_code: String,
}

#[derive(sqlx::FromRow)]
struct SampleCampaignRow {
    id: String,
    name: String,
    category: String,
    product_url: String,
    order_link: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl SampleCampaignRow {
    fn into_model(self) -> SampleCampaign {
        SampleCampaign {
            id: self.id,
            name: self.name,
            category: self.category,
            product_url: self.product_url,
            order_link: self.order_link,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SampleRequestRow {
    id: String,
    campaign_id: String,
    campaign_name: String,
    affiliate_id: String,
    affiliate_handle: String,
    video_url: String,
    ad_code: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl SampleRequestRow {
    fn into_model(self) -> Result<SampleRequest> {
        Ok(SampleRequest {
            id: self.id,
            campaign_id: self.campaign_id,
            campaign_name: self.campaign_name,
            affiliate_id: self.affiliate_id,
            affiliate_handle: self.affiliate_handle,
            video_url: self.video_url,
            ad_code: self.ad_code,
            status: SampleRequestStatus::parse(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const SELECT_REQUEST: &str = "SELECT id, campaign_id, campaign_name, affiliate_id, \
     affiliate_handle, video_url, ad_code, status, created_at FROM sample_requests";

/// Create a sample-product campaign
pub async fn create_sample_campaign(
    pool: &SqlitePool,
    input: SampleCampaignInput,
) -> Result<SampleCampaign> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation("campaign name must not be empty".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sample_campaigns (id, name, category, product_url, order_link, active, \
         created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(input.name.trim())
    .bind(&input.category)
    .bind(&input.product_url)
    .bind(&input.order_link)
    .bind(input.active)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let row: SampleCampaignRow = sqlx::query_as(
        "SELECT id, name, category, product_url, order_link, active, created_at \
         FROM sample_campaigns WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(row.into_model())
}

/// List sample-product campaigns, newest first
pub async fn list_sample_campaigns(pool: &SqlitePool) -> Result<Vec<SampleCampaign>> {
    let rows: Vec<SampleCampaignRow> = sqlx::query_as(
        "SELECT id, name, category, product_url, order_link, active, created_at \
         FROM sample_campaigns ORDER BY created_at DESC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SampleCampaignRow::into_model).collect())
}

/// Fetch one sample request by id
pub async fn get_request(pool: &SqlitePool, id: &str) -> Result<SampleRequest> {
    let row: Option<SampleRequestRow> =
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_REQUEST))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| Error::NotFound(format!("sample request {}", id)))?
        .into_model()
}

/// Create a sample request against an active sample campaign
///
/// The campaign name is denormalized onto the request so queue listings and
/// the export never need a join.
pub async fn create_request(
    pool: &SqlitePool,
    input: SampleRequestInput,
    affiliate_id: &str,
    affiliate_handle: &str,
) -> Result<SampleRequest> {
    if input.video_url.trim().is_empty() {
        return Err(Error::Validation("video URL must not be empty".to_string()));
    }
    if input.ad_code.trim().is_empty() {
        return Err(Error::Validation("ad code must not be empty".to_string()));
    }

    let campaign: Option<(String, bool)> =
        sqlx::query_as("SELECT name, active FROM sample_campaigns WHERE id = ?")
            .bind(&input.campaign_id)
            .fetch_optional(pool)
            .await?;
    let campaign_name = match campaign {
        None => return Err(Error::NotFound(format!("sample campaign {}", input.campaign_id))),
        Some((_, false)) => {
            return Err(Error::Validation(
                "sample campaign is not accepting requests".to_string(),
            ))
        }
        Some((name, true)) => name,
    };

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sample_requests (id, campaign_id, campaign_name, affiliate_id, \
         affiliate_handle, video_url, ad_code, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'PendingApproval', ?)",
    )
    .bind(&id)
    .bind(&input.campaign_id)
    .bind(&campaign_name)
    .bind(affiliate_id)
    .bind(affiliate_handle)
    .bind(input.video_url.trim())
    .bind(input.ad_code.trim())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_request(pool, &id).await
}

/// Fetch sample requests, optionally scoped to one affiliate
pub async fn list_requests(
    pool: &SqlitePool,
    affiliate_id: Option<&str>,
) -> Result<Vec<SampleRequest>> {
    let rows: Vec<SampleRequestRow> = match affiliate_id {
        Some(aid) => {
            sqlx::query_as(&format!("{} WHERE affiliate_id = ?", SELECT_REQUEST))
                .bind(aid)
                .fetch_all(pool)
                .await?
        }
        None => sqlx::query_as(SELECT_REQUEST).fetch_all(pool).await?,
    };

    rows.into_iter().map(SampleRequestRow::into_model).collect()
}

async fn current_status(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> Result<SampleRequestStatus> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM sample_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

    match status {
        None => Err(Error::NotFound(format!("sample request {}", id))),
        Some(raw) => SampleRequestStatus::parse(&raw),
    }
}

/// Advance a request one step along the fulfillment chain
pub async fn advance_request(pool: &SqlitePool, id: &str) -> Result<SampleRequest> {
    let mut tx = pool.begin().await?;

    let current = current_status(&mut tx, id).await?;
    let next = lifecycle::advance(current)?;

    // Guarded against a concurrent advance between the read and the write
    let result = sqlx::query("UPDATE sample_requests SET status = ? WHERE id = ? AND status = ?")
        .bind(next.as_str())
        .bind(id)
        .bind(current.as_str())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::InvalidTransition {
            entity: "sample request",
            action: "advance",
            from: current.as_str(),
        });
    }

    tx.commit().await?;
    get_request(pool, id).await
}

/// Reject a request still awaiting approval
pub async fn reject_request(pool: &SqlitePool, id: &str) -> Result<SampleRequest> {
    let mut tx = pool.begin().await?;

    let current = current_status(&mut tx, id).await?;
    let next = lifecycle::reject(current)?;

    let result = sqlx::query("UPDATE sample_requests SET status = ? WHERE id = ? AND status = ?")
        .bind(next.as_str())
        .bind(id)
        .bind(current.as_str())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::InvalidTransition {
            entity: "sample request",
            action: "reject",
            from: current.as_str(),
        });
    }

    tx.commit().await?;
    get_request(pool, id).await
}

/// Rows for the video-log CSV export
///
/// Only requests carrying both a video URL and an ad code make the log.
pub async fn video_log(pool: &SqlitePool) -> Result<Vec<serde_json::Value>> {
    let mut requests = list_requests(pool, None).await?;
    requests.retain(|r| !r.video_url.is_empty() && !r.ad_code.is_empty());
    hub_common::views::sort_sample_requests(&mut requests, hub_common::views::SortOrder::Latest);

    Ok(requests
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "date": r.created_at.format("%Y-%m-%d").to_string(),
                "affiliate_handle": r.affiliate_handle,
                "campaign_name": r.campaign_name,
                "video_url": r.video_url,
                "ad_code": r.ad_code,
                "status": r.status,
            })
        })
        .collect())
}
