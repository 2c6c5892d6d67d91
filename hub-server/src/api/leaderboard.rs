//! Leaderboard endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::store::leaderboard as store;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use hub_common::models::Leaderboard;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Timeframe key, e.g. "weekly" or "monthly"
    pub timeframe: Option<String>,
}

/// GET /api/leaderboard
pub async fn get_current(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Json<Leaderboard>> {
    let timeframe = params.timeframe.as_deref().unwrap_or("weekly");
    Ok(Json(store::get_leaderboard(&state.db, timeframe).await?))
}

/// PUT /api/admin/leaderboard
pub async fn publish(
    State(state): State<AppState>,
    Json(input): Json<store::LeaderboardInput>,
) -> ApiResult<Json<Leaderboard>> {
    let leaderboard = store::publish_leaderboard(&state.db, input).await?;
    info!(
        "Published {} leaderboard with {} entries",
        leaderboard.timeframe,
        leaderboard.top_affiliates.len()
    );
    Ok(Json(leaderboard))
}
