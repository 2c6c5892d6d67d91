//! Content reward campaign endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::store::campaigns as store;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use hub_common::events::HubEvent;
use hub_common::models::ContentRewardCampaign;
use hub_common::views;
use tracing::info;

/// GET /api/reward-campaigns
///
/// Affiliate listing: Active campaigns only, remaining budget descending so
/// campaigns with money left surface first.
pub async fn list_active(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<ContentRewardCampaign>>> {
    let mut campaigns = store::list_active_campaigns(&state.db).await?;
    views::sort_campaigns_by_remaining_budget(&mut campaigns);
    Ok(Json(campaigns))
}

/// GET /api/admin/reward-campaigns
pub async fn list_all(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ContentRewardCampaign>>> {
    Ok(Json(store::list_campaigns(&state.db).await?))
}

/// POST /api/admin/reward-campaigns
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<store::CampaignInput>,
) -> ApiResult<Json<ContentRewardCampaign>> {
    let campaign = store::create_campaign(&state.db, input).await?;
    info!("Created campaign {} ({})", campaign.id, campaign.title);

    state.events.emit_lossy(HubEvent::CampaignUpdated {
        campaign_id: campaign.id.clone(),
        status: campaign.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(campaign))
}

/// PUT /api/admin/reward-campaigns/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<store::CampaignInput>,
) -> ApiResult<Json<ContentRewardCampaign>> {
    let campaign = store::update_campaign(&state.db, &id, input).await?;

    state.events.emit_lossy(HubEvent::CampaignUpdated {
        campaign_id: campaign.id.clone(),
        status: campaign.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(campaign))
}

/// POST /api/admin/reward-campaigns/:id/rebuild-totals
///
/// Recovery endpoint: recompute aggregates from the submission set.
pub async fn rebuild_totals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContentRewardCampaign>> {
    let campaign = store::rebuild_campaign_totals(&state.db, &id).await?;
    info!(
        "Rebuilt totals for campaign {}: paid_out={:.2} views={} participants={}",
        campaign.id, campaign.total_paid_out, campaign.total_views, campaign.participant_count
    );
    Ok(Json(campaign))
}
