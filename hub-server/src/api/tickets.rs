//! Support ticket endpoints

use crate::api::auth::CurrentUser;
use crate::api::error::{ApiError, ApiResult};
use crate::store::tickets as store;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use hub_common::events::HubEvent;
use hub_common::models::{Ticket, TicketStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    /// Display handle for the admin queue; defaults to the caller's id
    pub affiliate_handle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// POST /api/tickets
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<Json<Ticket>> {
    let handle = request.affiliate_handle.unwrap_or_else(|| user.id.clone());
    let ticket = store::create_ticket(&state.db, &user.id, &handle, &request.subject).await?;

    state.events.emit_lossy(HubEvent::TicketStatusChanged {
        ticket_id: ticket.id.clone(),
        status: ticket.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(ticket))
}

/// GET /api/tickets
///
/// Affiliates see their own tickets; admins see all.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Ticket>>> {
    let affiliate_filter = if user.is_admin() { None } else { Some(user.id.as_str()) };
    Ok(Json(store::list_tickets(&state.db, affiliate_filter).await?))
}

/// POST /api/admin/tickets/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<Json<Ticket>> {
    let status = TicketStatus::parse(&request.status)
        .map_err(|_| ApiError::BadRequest(format!("unknown ticket status: {}", request.status)))?;

    let ticket = store::set_ticket_status(&state.db, &id, status).await?;

    state.events.emit_lossy(HubEvent::TicketStatusChanged {
        ticket_id: ticket.id.clone(),
        status: ticket.status.as_str().to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(ticket))
}
