//! hub-server library - Creator Hub HTTP service
//!
//! Serves the affiliate-facing and admin-facing API over the shared SQLite
//! database: content reward campaigns, submission review and payout, the
//! sample request queue, incentives, leaderboard, tickets, and settings.

use axum::Router;
use hub_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod store;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcast
    pub events: Arc<EventBus>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }
}

/// Build application router
///
/// Routes under /api/admin require an Admin role claim; /health is open;
/// everything else requires any authenticated user.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Admin-only routes
    let admin = Router::new()
        .route(
            "/api/admin/reward-campaigns",
            get(api::campaigns::list_all).post(api::campaigns::create),
        )
        .route("/api/admin/reward-campaigns/:id", put(api::campaigns::update))
        .route(
            "/api/admin/reward-campaigns/:id/rebuild-totals",
            post(api::campaigns::rebuild_totals),
        )
        .route("/api/admin/submissions/:id/approve", post(api::submissions::approve))
        .route("/api/admin/submissions/:id/reject", post(api::submissions::reject))
        .route("/api/admin/submissions/:id/finalize", post(api::submissions::finalize))
        .route(
            "/api/admin/sample-campaigns",
            post(api::sample_requests::create_campaign),
        )
        .route(
            "/api/admin/sample-requests/:id/advance",
            post(api::sample_requests::advance),
        )
        .route(
            "/api/admin/sample-requests/:id/reject",
            post(api::sample_requests::reject),
        )
        .route(
            "/api/admin/sample-requests/export",
            get(api::sample_requests::export_video_log),
        )
        .route("/api/admin/incentives", post(api::incentives::create))
        .route("/api/admin/leaderboard", put(api::leaderboard::publish))
        .route("/api/admin/tickets/:id/status", post(api::tickets::set_status))
        .route("/api/admin/settings", put(api::settings::update))
        .layer(middleware::from_fn(api::auth::require_admin));

    // Routes available to any authenticated user
    let authenticated = Router::new()
        .route("/api/events", get(api::sse::event_stream))
        .route("/api/reward-campaigns", get(api::campaigns::list_active))
        .route(
            "/api/submissions",
            get(api::submissions::list).post(api::submissions::create),
        )
        .route(
            "/api/submissions/:id/evidence",
            post(api::submissions::attach_evidence),
        )
        .route("/api/sample-campaigns", get(api::sample_requests::list_campaigns))
        .route(
            "/api/sample-requests",
            get(api::sample_requests::list).post(api::sample_requests::create),
        )
        .route("/api/incentives", get(api::incentives::list))
        .route("/api/incentives/:id/join", post(api::incentives::join))
        .route("/api/leaderboard", get(api::leaderboard::get_current))
        .route(
            "/api/tickets",
            get(api::tickets::list).post(api::tickets::create),
        )
        .route("/api/settings", get(api::settings::get_settings));

    // Public routes (no authentication)
    let public = api::health::health_routes();

    Router::new()
        .merge(admin)
        .merge(authenticated)
        .merge(public)
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
