//! Global settings endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::ApiResult;
use crate::AppState;
use axum::{extract::State, Json};
use hub_common::events::HubEvent;
use hub_common::settings::{self, GlobalSettings, SettingsUpdate};
use tracing::info;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<GlobalSettings>> {
    Ok(Json(settings::load_settings(&state.db).await?))
}

/// PUT /api/admin/settings
///
/// Every write bumps the settings version; the response carries the new one.
pub async fn update(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<GlobalSettings>> {
    let updated = settings::update_settings(&state.db, update).await?;
    info!("Settings updated to version {}", updated.version);

    state.events.emit_lossy(HubEvent::SettingsUpdated {
        version: updated.version,
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(updated))
}
