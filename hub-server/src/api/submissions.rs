//! Content submission endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::store::submissions as store;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use hub_common::events::HubEvent;
use hub_common::models::{ContentSubmission, SubmissionStatus};
use hub_common::views::{self, Pagination, SortOrder};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub campaign_id: String,
    pub video_url: String,
    /// Display handle shown in admin queues; defaults to the caller's id
    pub affiliate_handle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub campaign_id: Option<String>,
    pub affiliate_id: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<ContentSubmission>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Optional; an empty reason is rendered as "No reason provided"
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceRequest {
    pub screenshot_url: String,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub final_view_count: i64,
}

fn emit_status_change(state: &AppState, submission: &ContentSubmission, old_status: &str) {
    state.events.emit_lossy(HubEvent::SubmissionStatusChanged {
        submission_id: submission.id.clone(),
        campaign_id: submission.campaign_id.clone(),
        old_status: old_status.to_string(),
        new_status: submission.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });
}

/// POST /api/submissions
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSubmissionRequest>,
) -> ApiResult<Json<ContentSubmission>> {
    let settings = hub_common::settings::load_settings(&state.db).await?;
    let handle = request.affiliate_handle.unwrap_or_else(|| user.id.clone());

    let submission = store::create_submission(
        &state.db,
        store::SubmissionInput {
            campaign_id: request.campaign_id,
            video_url: request.video_url,
        },
        &user.id,
        &handle,
        settings.require_video_approval,
    )
    .await?;

    info!(
        "Submission {} created for campaign {} ({})",
        submission.id,
        submission.campaign_id,
        submission.status.as_str()
    );

    state.events.emit_lossy(HubEvent::SubmissionCreated {
        submission_id: submission.id.clone(),
        campaign_id: submission.campaign_id.clone(),
        affiliate_id: submission.affiliate_id.clone(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(submission))
}

/// GET /api/submissions
///
/// Affiliates only see their own submissions; admins may filter freely.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SubmissionListResponse>> {
    let affiliate_filter = if user.is_admin() {
        params.affiliate_id.clone()
    } else {
        Some(user.id.clone())
    };

    let status = match params.status.as_deref() {
        Some(raw) => Some(SubmissionStatus::parse(raw).map_err(|_| {
            crate::api::error::ApiError::BadRequest(format!("unknown status filter: {}", raw))
        })?),
        None => None,
    };

    let submissions = store::list_submissions(&state.db, params.campaign_id.as_deref()).await?;
    let mut submissions = views::filter_submissions(
        submissions,
        status,
        None, // campaign filter already applied in the query
        affiliate_filter.as_deref(),
    );

    let order = SortOrder::parse(params.sort.as_deref().unwrap_or("latest"));
    views::sort_submissions(&mut submissions, order);

    let (page_items, pagination) = views::paginate(&submissions, params.page.unwrap_or(1));

    Ok(Json(SubmissionListResponse {
        submissions: page_items,
        pagination,
    }))
}

/// POST /api/admin/submissions/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContentSubmission>> {
    let submission = store::approve_submission(&state.db, &id).await?;
    emit_status_change(&state, &submission, "PendingReview");
    Ok(Json(submission))
}

/// POST /api/admin/submissions/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<ContentSubmission>> {
    let submission = store::reject_submission(&state.db, &id, &request.reason).await?;
    emit_status_change(&state, &submission, "PendingReview");
    Ok(Json(submission))
}

/// POST /api/submissions/:id/evidence
///
/// Affiliates may only attach evidence to their own submissions.
pub async fn attach_evidence(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<EvidenceRequest>,
) -> ApiResult<Json<ContentSubmission>> {
    let owner = if user.is_admin() { None } else { Some(user.id.as_str()) };
    let submission =
        store::attach_evidence(&state.db, &id, owner, &request.screenshot_url).await?;
    emit_status_change(&state, &submission, "Approved");
    Ok(Json(submission))
}

/// POST /api/admin/submissions/:id/finalize
pub async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FinalizeRequest>,
) -> ApiResult<Json<ContentSubmission>> {
    let outcome = store::finalize_payout(&state.db, &id, request.final_view_count).await?;

    info!(
        "Finalized payout for submission {}: {} views, ${:.2}",
        outcome.submission.id,
        request.final_view_count,
        outcome.submission.calculated_earnings.unwrap_or(0.0)
    );

    emit_status_change(&state, &outcome.submission, "AwaitingPayout");
    state.events.emit_lossy(HubEvent::PayoutFinalized {
        submission_id: outcome.submission.id.clone(),
        campaign_id: outcome.campaign.id.clone(),
        final_view_count: request.final_view_count,
        earnings: outcome.submission.calculated_earnings.unwrap_or(0.0),
        timestamp: chrono::Utc::now(),
    });

    if outcome.budget_exhausted {
        info!(
            "Campaign {} budget exhausted (paid out {:.2})",
            outcome.campaign.id, outcome.campaign.total_paid_out
        );
        state.events.emit_lossy(HubEvent::CampaignBudgetExhausted {
            campaign_id: outcome.campaign.id.clone(),
            total_paid_out: outcome.campaign.total_paid_out,
            timestamp: chrono::Utc::now(),
        });
    }

    Ok(Json(outcome.submission))
}
