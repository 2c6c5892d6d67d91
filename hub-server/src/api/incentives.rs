//! Incentive campaign endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::store::incentives as store;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use hub_common::events::HubEvent;
use hub_common::models::IncentiveCampaign;
use tracing::info;

/// GET /api/incentives
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<IncentiveCampaign>>> {
    Ok(Json(store::list_incentives(&state.db).await?))
}

/// POST /api/admin/incentives
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<store::IncentiveInput>,
) -> ApiResult<Json<IncentiveCampaign>> {
    let incentive = store::create_incentive(&state.db, input).await?;
    info!("Created incentive {} ({})", incentive.id, incentive.title);
    Ok(Json(incentive))
}

/// POST /api/incentives/:id/join
pub async fn join(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<IncentiveCampaign>> {
    let incentive = store::join_incentive(&state.db, &id, &user.id).await?;

    state.events.emit_lossy(HubEvent::IncentiveJoined {
        incentive_id: incentive.id.clone(),
        affiliate_id: user.id,
        joined_affiliates: incentive.joined_affiliates,
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(incentive))
}
