//! Content submission storage and the payout transaction
//!
//! Transitions are enforced twice: the pure lifecycle rules shape the error,
//! and a guarded UPDATE enforces them atomically against concurrent writers.
//! Finalization runs the guarded status flip and the budget-capped campaign
//! increments inside one transaction, so a double finalize or an over-budget
//! payout can never partially apply.

use chrono::{DateTime, Utc};
use hub_common::lifecycle::submission as lifecycle;
use hub_common::models::{ContentSubmission, ContentRewardCampaign, SubmissionStatus};
use hub_common::{Error, Result};
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Tolerance for float accumulation when comparing paid-out against budget
const BUDGET_EPSILON: f64 = 1e-9;

/// Fields accepted when creating a submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionInput {
    pub campaign_id: String,
    pub video_url: String,
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: String,
    campaign_id: String,
    affiliate_id: String,
    affiliate_handle: String,
    video_url: String,
    status: String,
    rejection_reason: Option<String>,
    submitted_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    screenshot_url: Option<String>,
    final_view_count: Option<i64>,
    calculated_earnings: Option<f64>,
}

impl SubmissionRow {
    fn into_model(self) -> Result<ContentSubmission> {
        Ok(ContentSubmission {
            id: self.id,
            campaign_id: self.campaign_id,
            affiliate_id: self.affiliate_id,
            affiliate_handle: self.affiliate_handle,
            video_url: self.video_url,
            status: SubmissionStatus::parse(&self.status)?,
            rejection_reason: self.rejection_reason,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            screenshot_url: self.screenshot_url,
            final_view_count: self.final_view_count,
            calculated_earnings: self.calculated_earnings,
        })
    }
}

const SELECT_SUBMISSION: &str = "SELECT id, campaign_id, affiliate_id, affiliate_handle, \
     video_url, status, rejection_reason, submitted_at, approved_at, screenshot_url, \
     final_view_count, calculated_earnings FROM submissions";

/// Fetch one submission by id
pub async fn get_submission(pool: &SqlitePool, id: &str) -> Result<ContentSubmission> {
    let row: Option<SubmissionRow> =
        sqlx::query_as(&format!("{} WHERE id = ?", SELECT_SUBMISSION))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| Error::NotFound(format!("submission {}", id)))?
        .into_model()
}

/// Fetch all submissions, optionally scoped to one campaign
pub async fn list_submissions(
    pool: &SqlitePool,
    campaign_id: Option<&str>,
) -> Result<Vec<ContentSubmission>> {
    let rows: Vec<SubmissionRow> = match campaign_id {
        Some(cid) => {
            sqlx::query_as(&format!("{} WHERE campaign_id = ?", SELECT_SUBMISSION))
                .bind(cid)
                .fetch_all(pool)
                .await?
        }
        None => sqlx::query_as(SELECT_SUBMISSION).fetch_all(pool).await?,
    };

    rows.into_iter().map(SubmissionRow::into_model).collect()
}

/// Create a submission in the review pipeline
///
/// The campaign must exist and be Active. When review is disabled
/// (`require_approval` false) the submission enters directly as Approved.
/// participant_count counts unique affiliates: it is only incremented when
/// this affiliate has no prior submission on the campaign, atomically with
/// the insert.
pub async fn create_submission(
    pool: &SqlitePool,
    input: SubmissionInput,
    affiliate_id: &str,
    affiliate_handle: &str,
    require_approval: bool,
) -> Result<ContentSubmission> {
    if input.video_url.trim().is_empty() {
        return Err(Error::Validation("video URL must not be empty".to_string()));
    }

    let mut tx = pool.begin().await?;

    let campaign_status: Option<String> =
        sqlx::query_scalar("SELECT status FROM reward_campaigns WHERE id = ?")
            .bind(&input.campaign_id)
            .fetch_optional(&mut *tx)
            .await?;
    match campaign_status.as_deref() {
        None => return Err(Error::NotFound(format!("campaign {}", input.campaign_id))),
        Some("Active") => {}
        Some(_) => {
            return Err(Error::Validation(
                "campaign is no longer accepting submissions".to_string(),
            ))
        }
    }

    let has_prior: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM submissions WHERE campaign_id = ? AND affiliate_id = ?)",
    )
    .bind(&input.campaign_id)
    .bind(affiliate_id)
    .fetch_one(&mut *tx)
    .await?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let (status, approved_at) = if require_approval {
        (SubmissionStatus::PendingReview, None)
    } else {
        (SubmissionStatus::Approved, Some(now))
    };

    sqlx::query(
        "INSERT INTO submissions (id, campaign_id, affiliate_id, affiliate_handle, video_url, \
         status, submitted_at, approved_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.campaign_id)
    .bind(affiliate_id)
    .bind(affiliate_handle)
    .bind(input.video_url.trim())
    .bind(status.as_str())
    .bind(now)
    .bind(approved_at)
    .execute(&mut *tx)
    .await?;

    if !has_prior {
        sqlx::query(
            "UPDATE reward_campaigns SET participant_count = participant_count + 1 WHERE id = ?",
        )
        .bind(&input.campaign_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_submission(pool, &id).await
}

/// Build the precise error for a guarded update that matched no row
async fn transition_error(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    check: fn(SubmissionStatus) -> Result<SubmissionStatus>,
) -> Error {
    let status: Option<String> = match sqlx::query_scalar("SELECT status FROM submissions WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    {
        Ok(s) => s,
        Err(e) => return Error::Database(e),
    };

    match status {
        None => Error::NotFound(format!("submission {}", id)),
        Some(raw) => match SubmissionStatus::parse(&raw) {
            // The guarded update failed, so the lifecycle check must fail too
            Ok(current) => match check(current) {
                Err(e) => e,
                Ok(_) => Error::Internal(format!(
                    "guarded update failed for submission {} in state {}",
                    id, raw
                )),
            },
            Err(e) => e,
        },
    }
}

/// Approve a pending submission
pub async fn approve_submission(pool: &SqlitePool, id: &str) -> Result<ContentSubmission> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE submissions SET status = 'Approved', approved_at = ? \
         WHERE id = ? AND status = 'PendingReview'",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(transition_error(&mut tx, id, lifecycle::approve).await);
    }

    tx.commit().await?;
    get_submission(pool, id).await
}

/// Reject a pending submission
///
/// The reason is optional; an empty string is stored as-is and rendered as
/// "No reason provided" by clients.
pub async fn reject_submission(
    pool: &SqlitePool,
    id: &str,
    reason: &str,
) -> Result<ContentSubmission> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE submissions SET status = 'Rejected', rejection_reason = ? \
         WHERE id = ? AND status = 'PendingReview'",
    )
    .bind(reason.trim())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(transition_error(&mut tx, id, lifecycle::reject).await);
    }

    tx.commit().await?;
    get_submission(pool, id).await
}

/// Attach view-count evidence, moving the submission to AwaitingPayout
///
/// When `owner` is set the submission must belong to that affiliate.
pub async fn attach_evidence(
    pool: &SqlitePool,
    id: &str,
    owner: Option<&str>,
    screenshot_url: &str,
) -> Result<ContentSubmission> {
    if screenshot_url.trim().is_empty() {
        return Err(Error::Validation("screenshot URL must not be empty".to_string()));
    }

    let mut tx = pool.begin().await?;

    if let Some(affiliate_id) = owner {
        let owner_id: Option<String> =
            sqlx::query_scalar("SELECT affiliate_id FROM submissions WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match owner_id {
            None => return Err(Error::NotFound(format!("submission {}", id))),
            Some(actual) if actual != affiliate_id => {
                return Err(Error::PermissionDenied(
                    "submission belongs to another affiliate".to_string(),
                ))
            }
            Some(_) => {}
        }
    }

    let result = sqlx::query(
        "UPDATE submissions SET status = 'AwaitingPayout', screenshot_url = ? \
         WHERE id = ? AND status = 'Approved'",
    )
    .bind(screenshot_url.trim())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(transition_error(&mut tx, id, lifecycle::attach_evidence).await);
    }

    tx.commit().await?;
    get_submission(pool, id).await
}

/// Outcome of a successful payout finalization
pub struct FinalizeOutcome {
    pub submission: ContentSubmission,
    pub campaign: ContentRewardCampaign,
    /// True when this payout consumed the last of the budget and the
    /// campaign was flipped to Ended
    pub budget_exhausted: bool,
}

/// Finalize a payout
///
/// In one transaction: compute earnings from the campaign's rate and clamps,
/// flip the submission AwaitingPayout -> Paid with a guarded UPDATE (zero
/// rows means a concurrent or repeated finalize already won, and nothing is
/// double-counted), then apply budget-guarded atomic increments to the
/// campaign counters. Exceeding total_budget rolls everything back.
pub async fn finalize_payout(
    pool: &SqlitePool,
    id: &str,
    final_view_count: i64,
) -> Result<FinalizeOutcome> {
    let mut tx = pool.begin().await?;

    let campaign_id: Option<String> =
        sqlx::query_scalar("SELECT campaign_id FROM submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let campaign_id = campaign_id.ok_or_else(|| Error::NotFound(format!("submission {}", id)))?;

    let rates: Option<(f64, f64, f64)> = sqlx::query_as(
        "SELECT payout_rate, minimum_payout, maximum_payout FROM reward_campaigns WHERE id = ?",
    )
    .bind(&campaign_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (rate, min, max) =
        rates.ok_or_else(|| Error::NotFound(format!("campaign {}", campaign_id)))?;

    // Validates final_view_count > 0 before any write
    let earnings = lifecycle::compute_payout(final_view_count, rate, min, max)?;

    let result = sqlx::query(
        "UPDATE submissions SET status = 'Paid', final_view_count = ?, calculated_earnings = ? \
         WHERE id = ? AND status = 'AwaitingPayout'",
    )
    .bind(final_view_count)
    .bind(earnings)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(transition_error(&mut tx, id, lifecycle::finalize).await);
    }

    // Budget-guarded atomic increments; no read-modify-write in process
    let result = sqlx::query(
        "UPDATE reward_campaigns \
         SET total_paid_out = total_paid_out + ?, total_views = total_views + ? \
         WHERE id = ? AND total_paid_out + ? <= total_budget + ?",
    )
    .bind(earnings)
    .bind(final_view_count)
    .bind(&campaign_id)
    .bind(earnings)
    .bind(BUDGET_EPSILON)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        let (budget, paid): (f64, f64) = sqlx::query_as(
            "SELECT total_budget, total_paid_out FROM reward_campaigns WHERE id = ?",
        )
        .bind(&campaign_id)
        .fetch_one(&mut *tx)
        .await?;
        // Dropping the transaction rolls back the status flip
        return Err(Error::BudgetExhausted {
            campaign_id,
            remaining: budget - paid,
        });
    }

    // Exact exhaustion retires the campaign
    let (budget, paid): (f64, f64) = sqlx::query_as(
        "SELECT total_budget, total_paid_out FROM reward_campaigns WHERE id = ?",
    )
    .bind(&campaign_id)
    .fetch_one(&mut *tx)
    .await?;
    let budget_exhausted = paid + BUDGET_EPSILON >= budget;
    if budget_exhausted {
        sqlx::query("UPDATE reward_campaigns SET status = 'Ended' WHERE id = ?")
            .bind(&campaign_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let submission = get_submission(pool, id).await?;
    let campaign = super::campaigns::get_campaign(pool, &campaign_id).await?;

    Ok(FinalizeOutcome {
        submission,
        campaign,
        budget_exhausted,
    })
}
