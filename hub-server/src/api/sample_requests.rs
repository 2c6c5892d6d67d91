//! Sample campaign and sample request endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::store::sample_requests as store;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use hub_common::events::HubEvent;
use hub_common::models::{SampleCampaign, SampleRequest};
use hub_common::views::{self, Pagination, SortOrder};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub campaign_id: String,
    pub video_url: String,
    pub ad_code: String,
    /// Display handle shown in the queue; defaults to the caller's id
    pub affiliate_handle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SampleRequestListResponse {
    pub requests: Vec<SampleRequest>,
    pub pagination: Pagination,
}

fn emit_status_change(state: &AppState, request: &SampleRequest, old_status: &str) {
    state.events.emit_lossy(HubEvent::SampleRequestStatusChanged {
        request_id: request.id.clone(),
        old_status: old_status.to_string(),
        new_status: request.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });
}

/// GET /api/sample-campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<SampleCampaign>>> {
    Ok(Json(store::list_sample_campaigns(&state.db).await?))
}

/// POST /api/admin/sample-campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<store::SampleCampaignInput>,
) -> ApiResult<Json<SampleCampaign>> {
    let campaign = store::create_sample_campaign(&state.db, input).await?;
    info!("Created sample campaign {} ({})", campaign.id, campaign.name);
    Ok(Json(campaign))
}

/// POST /api/sample-requests
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<Json<SampleRequest>> {
    let handle = body.affiliate_handle.unwrap_or_else(|| user.id.clone());
    let request = store::create_request(
        &state.db,
        store::SampleRequestInput {
            campaign_id: body.campaign_id,
            video_url: body.video_url,
            ad_code: body.ad_code,
        },
        &user.id,
        &handle,
    )
    .await?;

    state.events.emit_lossy(HubEvent::SampleRequestCreated {
        request_id: request.id.clone(),
        campaign_id: request.campaign_id.clone(),
        affiliate_id: request.affiliate_id.clone(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(request))
}

/// GET /api/sample-requests
///
/// Affiliates see their own requests; admins see the whole queue with
/// search over affiliate handle and campaign name.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SampleRequestListResponse>> {
    let affiliate_filter = if user.is_admin() { None } else { Some(user.id.as_str()) };

    let requests = store::list_requests(&state.db, affiliate_filter).await?;
    let mut requests = match params.search.as_deref() {
        Some(query) => views::search_sample_requests(requests, query),
        None => requests,
    };

    let order = SortOrder::parse(params.sort.as_deref().unwrap_or("latest"));
    views::sort_sample_requests(&mut requests, order);

    let (page_items, pagination) = views::paginate(&requests, params.page.unwrap_or(1));

    Ok(Json(SampleRequestListResponse {
        requests: page_items,
        pagination,
    }))
}

/// POST /api/admin/sample-requests/:id/advance
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SampleRequest>> {
    let before = store::get_request(&state.db, &id).await?;
    let request = store::advance_request(&state.db, &id).await?;
    emit_status_change(&state, &request, before.status.as_str());
    Ok(Json(request))
}

/// POST /api/admin/sample-requests/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SampleRequest>> {
    let before = store::get_request(&state.db, &id).await?;
    let request = store::reject_request(&state.db, &id).await?;
    emit_status_change(&state, &request, before.status.as_str());
    Ok(Json(request))
}

/// GET /api/admin/sample-requests/export
///
/// CSV video log of every request carrying both a video URL and an ad code.
pub async fn export_video_log(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let rows = store::video_log(&state.db).await?;
    let csv = hub_common::export::to_csv(&rows).map_err(crate::api::error::ApiError::Domain)?;
    let filename = hub_common::export::csv_filename("video_log", chrono::Utc::now());

    info!("Exported video log: {} rows", rows.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}
