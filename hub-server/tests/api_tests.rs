//! Integration tests for the hub-server API
//!
//! Covers the submission lifecycle and payout math, budget enforcement,
//! campaign aggregate rebuilds, the sample request queue and CSV export,
//! incentives, tickets, settings versioning, and role checks.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use hub_common::events::EventBus;
use hub_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: in-memory database with full schema and default settings
async fn setup_test_db() -> SqlitePool {
    // Single connection: each in-memory connection is its own database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    hub_common::db::create_schema(&pool).await.expect("Should create schema");
    hub_common::db::init_default_settings(&pool)
        .await
        .expect("Should seed default settings");
    pool
}

async fn setup_app() -> (axum::Router, SqlitePool) {
    let db = setup_test_db().await;
    let state = AppState::new(db.clone(), Arc::new(EventBus::new(100)));
    (build_router(state), db)
}

/// Test helper: request carrying an identity claim
fn request_as(method: &str, uri: &str, user_id: &str, role: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id)
        .header("x-role", role);

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    request_as(method, uri, "admin-1", "Admin", body)
}

fn affiliate(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    request_as(method, uri, "aff-1", "Affiliate", body)
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = extract_json(response.into_body()).await;
    (status, body)
}

async fn send_raw(app: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn campaign_body(budget: f64) -> Value {
    json!({
        "title": "Summer Launch",
        "payout_rate": 5.0,
        "total_budget": budget,
        "minimum_payout": 1.0,
        "maximum_payout": 50.0,
        "platforms": ["TikTok"],
        "requirements": ["Original content only"],
        "assets": [{"title": "Brief", "url": "https://example.com/brief.pdf"}]
    })
}

/// Create a campaign, returning its id
async fn create_campaign(app: &axum::Router, budget: f64) -> String {
    let (status, body) = send(
        app,
        admin("POST", "/api/admin/reward-campaigns", Some(campaign_body(budget))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

/// Walk a submission to AwaitingPayout for the given affiliate
async fn submission_awaiting_payout(app: &axum::Router, campaign_id: &str, user: &str) -> String {
    let (status, body) = send(
        app,
        request_as(
            "POST",
            "/api/submissions",
            user,
            "Affiliate",
            Some(json!({
                "campaign_id": campaign_id,
                "video_url": "https://tiktok.com/v/1",
                "affiliate_handle": user,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        admin("POST", &format!("/api/admin/submissions/{}/approve", id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app,
        request_as(
            "POST",
            &format!("/api/submissions/{}/evidence", id),
            user,
            "Affiliate",
            Some(json!({"screenshot_url": "https://img.example.com/1.png"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    id
}

// =============================================================================
// Health and auth
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _db) = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hub-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_admin_routes_reject_affiliates() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        affiliate("POST", "/api/admin/reward-campaigns", Some(campaign_body(100.0))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_missing_identity_rejected() {
    let (app, _db) = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/reward-campaigns")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Campaign CRUD and validation
// =============================================================================

#[tokio::test]
async fn test_campaign_validation() {
    let (app, _db) = setup_app().await;

    // Maximum payout below minimum
    let mut bad = campaign_body(100.0);
    bad["maximum_payout"] = json!(0.5);
    let (status, body) = send(&app, admin("POST", "/api/admin/reward-campaigns", Some(bad))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Non-positive rate
    let mut bad = campaign_body(100.0);
    bad["payout_rate"] = json!(0.0);
    let (status, _) = send(&app, admin("POST", "/api/admin/reward-campaigns", Some(bad))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_affiliate_listing_sorted_by_remaining_budget() {
    let (app, _db) = setup_app().await;

    let small = create_campaign(&app, 20.0).await;
    let large = create_campaign(&app, 1000.0).await;

    // Spend some of the large campaign's budget
    let sub = submission_awaiting_payout(&app, &large, "aff-1").await;
    let (status, _) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, affiliate("GET", "/api/reward-campaigns", None)).await;
    assert_eq!(status, StatusCode::OK);
    let campaigns = body.as_array().unwrap();
    assert_eq!(campaigns.len(), 2);
    // 990 remaining beats 20 remaining
    assert_eq!(campaigns[0]["id"], large.as_str());
    assert_eq!(campaigns[1]["id"], small.as_str());
}

#[tokio::test]
async fn test_update_without_status_preserves_ended_campaign() {
    let (app, _db) = setup_app().await;

    // Exhaust the campaign's budget so it flips to Ended
    let campaign_id = create_campaign(&app, 10.0).await;
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;
    let (status, _) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // An edit that omits status must not revive the campaign
    let mut edit = campaign_body(10.0);
    edit["title"] = json!("Summer Launch (edited)");
    let (status, body) = send(
        &app,
        admin(
            "PUT",
            &format!("/api/admin/reward-campaigns/{}", campaign_id),
            Some(edit),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Summer Launch (edited)");
    assert_eq!(body["status"], "Ended");

    // Still absent from the affiliate listing and closed to submissions
    let (_, body) = send(&app, affiliate("GET", "/api/reward-campaigns", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // An explicit status is still honored
    let mut edit = campaign_body(100.0);
    edit["status"] = json!("Active");
    let (_, body) = send(
        &app,
        admin(
            "PUT",
            &format!("/api/admin/reward-campaigns/{}", campaign_id),
            Some(edit),
        ),
    )
    .await;
    assert_eq!(body["status"], "Active");
}

// =============================================================================
// Submission lifecycle and payout
// =============================================================================

#[tokio::test]
async fn test_full_submission_lifecycle() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Paid");
    assert_eq!(body["final_view_count"], 2000);
    assert_eq!(body["calculated_earnings"], 10.0);

    // Campaign aggregates were incremented
    let (status, body) = send(&app, admin("GET", "/api/admin/reward-campaigns", None)).await;
    assert_eq!(status, StatusCode::OK);
    let campaign = &body.as_array().unwrap()[0];
    assert_eq!(campaign["total_paid_out"], 10.0);
    assert_eq!(campaign["total_views"], 2000);
    assert_eq!(campaign["participant_count"], 1);
}

#[tokio::test]
async fn test_payout_clamping() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    // 100 views at $5/1k is $0.50, clamped up to the $1 floor
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;
    let (_, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 100})),
        ),
    )
    .await;
    assert_eq!(body["calculated_earnings"], 1.0);

    // 20,000 views at $5/1k is $100, clamped down to the $50 ceiling
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-2").await;
    let (_, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 20000})),
        ),
    )
    .await;
    assert_eq!(body["calculated_earnings"], 50.0);
}

#[tokio::test]
async fn test_double_finalize_conflicts() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;

    let finalize = || {
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        )
    };

    let (status, _) = send(&app, finalize()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, finalize()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    // The campaign was only charged once
    let (_, body) = send(&app, admin("GET", "/api/admin/reward-campaigns", None)).await;
    assert_eq!(body.as_array().unwrap()[0]["total_paid_out"], 10.0);
}

#[tokio::test]
async fn test_finalize_requires_positive_views() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Nothing was written
    let (_, body) = send(&app, affiliate("GET", "/api/submissions", None)).await;
    assert_eq!(body["submissions"][0]["status"], "AwaitingPayout");
}

#[tokio::test]
async fn test_budget_cap_blocks_and_rolls_back() {
    let (app, _db) = setup_app().await;
    // Budget fits one $10 payout but not two
    let campaign_id = create_campaign(&app, 15.0).await;

    let first = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;
    let second = submission_awaiting_payout(&app, &campaign_id, "aff-2").await;

    let (status, _) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", first),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", second),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "BUDGET_EXHAUSTED");

    // The status flip rolled back with the failed increment
    let (_, body) = send(
        &app,
        request_as("GET", "/api/submissions", "aff-2", "Affiliate", None),
    )
    .await;
    assert_eq!(body["submissions"][0]["status"], "AwaitingPayout");

    let (_, body) = send(&app, admin("GET", "/api/admin/reward-campaigns", None)).await;
    assert_eq!(body.as_array().unwrap()[0]["total_paid_out"], 10.0);
}

#[tokio::test]
async fn test_exact_exhaustion_ends_campaign() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 10.0).await;
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;

    let (status, _) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, admin("GET", "/api/admin/reward-campaigns", None)).await;
    let campaign = &body.as_array().unwrap()[0];
    assert_eq!(campaign["status"], "Ended");
    assert_eq!(campaign["total_paid_out"], 10.0);

    // Ended campaigns no longer accept submissions
    let (status, _) = send(
        &app,
        affiliate(
            "POST",
            "/api/submissions",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/9"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_participant_count_is_unique_affiliates() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    let submit = |user: &'static str| {
        request_as(
            "POST",
            "/api/submissions",
            user,
            "Affiliate",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
        )
    };

    send(&app, submit("aff-1")).await;
    send(&app, submit("aff-1")).await; // same affiliate again
    send(&app, submit("aff-2")).await;

    let (_, body) = send(&app, admin("GET", "/api/admin/reward-campaigns", None)).await;
    assert_eq!(body.as_array().unwrap()[0]["participant_count"], 2);
}

#[tokio::test]
async fn test_rejected_submission_is_terminal() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    let (_, body) = send(
        &app,
        affiliate(
            "POST",
            "/api/submissions",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
        ),
    )
    .await;
    let sub = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/reject", sub),
            Some(json!({"reason": "Off brand"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rejection_reason"], "Off brand");

    // No revival: approval after rejection conflicts
    let (status, body) = send(
        &app,
        admin("POST", &format!("/api/admin/submissions/{}/approve", sub), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_reject_with_empty_reason_allowed() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    let (_, body) = send(
        &app,
        affiliate(
            "POST",
            "/api/submissions",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
        ),
    )
    .await;
    let sub = body["id"].as_str().unwrap().to_string();

    // The reason field is optional; clients render an empty one as
    // "No reason provided"
    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/reject", sub),
            Some(json!({"reason": ""})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["rejection_reason"], "");
}

#[tokio::test]
async fn test_evidence_ownership_enforced() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    let (_, body) = send(
        &app,
        affiliate(
            "POST",
            "/api/submissions",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
        ),
    )
    .await;
    let sub = body["id"].as_str().unwrap().to_string();
    send(
        &app,
        admin("POST", &format!("/api/admin/submissions/{}/approve", sub), None),
    )
    .await;

    // A different affiliate cannot attach evidence
    let (status, _) = send(
        &app,
        request_as(
            "POST",
            &format!("/api/submissions/{}/evidence", sub),
            "aff-2",
            "Affiliate",
            Some(json!({"screenshot_url": "https://img.example.com/x.png"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_affiliates_only_see_own_submissions() {
    let (app, _db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;

    for user in ["aff-1", "aff-2"] {
        send(
            &app,
            request_as(
                "POST",
                "/api/submissions",
                user,
                "Affiliate",
                Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
            ),
        )
        .await;
    }

    let (_, body) = send(&app, affiliate("GET", "/api/submissions", None)).await;
    let submissions = body["submissions"].as_array().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["affiliate_id"], "aff-1");

    // Admin sees everything
    let (_, body) = send(&app, admin("GET", "/api/submissions", None)).await;
    assert_eq!(body["submissions"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_results"], 2);
}

#[tokio::test]
async fn test_unknown_status_filter_is_bad_request() {
    let (app, _db) = setup_app().await;
    let (status, _) = send(&app, admin("GET", "/api/submissions?status=Bogus", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Rebuild totals
// =============================================================================

#[tokio::test]
async fn test_rebuild_totals_restores_counters() {
    let (app, db) = setup_app().await;
    let campaign_id = create_campaign(&app, 1000.0).await;
    let sub = submission_awaiting_payout(&app, &campaign_id, "aff-1").await;
    send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/submissions/{}/finalize", sub),
            Some(json!({"final_view_count": 2000})),
        ),
    )
    .await;

    // Skew the counters behind the API's back
    sqlx::query(
        "UPDATE reward_campaigns SET total_paid_out = 999, total_views = 0, participant_count = 7",
    )
    .execute(&db)
    .await
    .unwrap();

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/reward-campaigns/{}/rebuild-totals", campaign_id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_paid_out"], 10.0);
    assert_eq!(body["total_views"], 2000);
    assert_eq!(body["participant_count"], 1);
}

// =============================================================================
// Sample request queue
// =============================================================================

async fn create_sample_campaign(app: &axum::Router, name: &str) -> String {
    let (status, body) = send(
        app,
        admin(
            "POST",
            "/api/admin/sample-campaigns",
            Some(json!({"name": name, "category": "Beauty", "product_url": "https://shop.example.com/p"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn create_sample_request(app: &axum::Router, campaign_id: &str, user: &str) -> String {
    let (status, body) = send(
        app,
        request_as(
            "POST",
            "/api/sample-requests",
            user,
            "Affiliate",
            Some(json!({
                "campaign_id": campaign_id,
                "video_url": "https://tiktok.com/v/7",
                "ad_code": "AD-123",
                "affiliate_handle": user,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_sample_request_walks_the_chain() {
    let (app, _db) = setup_app().await;
    let campaign = create_sample_campaign(&app, "Lip Kit").await;
    let req = create_sample_request(&app, &campaign, "aff-1").await;

    let advance = || admin("POST", &format!("/api/admin/sample-requests/{}/advance", req), None);

    for expected in ["PendingShowcase", "PendingOrder", "Shipped"] {
        let (status, body) = send(&app, advance()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);
    }

    // Terminal: no further advance
    let (status, body) = send(&app, advance()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_sample_request_reject_only_pending_approval() {
    let (app, _db) = setup_app().await;
    let campaign = create_sample_campaign(&app, "Lip Kit").await;
    let req = create_sample_request(&app, &campaign, "aff-1").await;

    send(
        &app,
        admin("POST", &format!("/api/admin/sample-requests/{}/advance", req), None),
    )
    .await;

    let (status, _) = send(
        &app,
        admin("POST", &format!("/api/admin/sample-requests/{}/reject", req), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sample_queue_search() {
    let (app, _db) = setup_app().await;
    let lip = create_sample_campaign(&app, "Lip Kit").await;
    let serum = create_sample_campaign(&app, "Face Serum").await;
    create_sample_request(&app, &lip, "creatorjane").await;
    create_sample_request(&app, &serum, "bobsmith").await;

    let (status, body) = send(&app, admin("GET", "/api/sample-requests?search=jane", None)).await;
    assert_eq!(status, StatusCode::OK);
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["affiliate_handle"], "creatorjane");

    // Search matches campaign name too
    let (_, body) = send(&app, admin("GET", "/api/sample-requests?search=serum", None)).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_csv_export_round_trip() {
    let (app, _db) = setup_app().await;
    let campaign = create_sample_campaign(&app, "Lip Kit").await;
    for user in ["aff-1", "aff-2", "aff-3"] {
        create_sample_request(&app, &campaign, user).await;
    }

    let (status, csv) = send_raw(
        &app,
        admin("GET", "/api/admin/sample-requests/export", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4); // header + 3 rows
    assert!(lines[0].contains("affiliate_handle"));
    assert!(lines[0].contains("ad_code"));
    assert!(csv.contains("\"AD-123\""));
}

// =============================================================================
// Incentives
// =============================================================================

#[tokio::test]
async fn test_incentive_join_activates_at_threshold() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        admin(
            "POST",
            "/api/admin/incentives",
            Some(json!({
                "title": "August Sprint",
                "description": "Post daily",
                "rules": ["One video per day"],
                "rewards": "$500 bonus pool",
                "start_date": "2026-08-01T00:00:00Z",
                "end_date": "2026-09-01T00:00:00Z",
                "min_affiliates": 2
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Pending");
    let id = body["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        request_as("POST", &format!("/api/incentives/{}/join", id), "aff-1", "Affiliate", None),
    )
    .await;
    assert_eq!(body["joined_affiliates"], 1);
    assert_eq!(body["status"], "Pending");

    // Repeat join by the same affiliate is a no-op
    let (_, body) = send(
        &app,
        request_as("POST", &format!("/api/incentives/{}/join", id), "aff-1", "Affiliate", None),
    )
    .await;
    assert_eq!(body["joined_affiliates"], 1);

    let (_, body) = send(
        &app,
        request_as("POST", &format!("/api/incentives/{}/join", id), "aff-2", "Affiliate", None),
    )
    .await;
    assert_eq!(body["joined_affiliates"], 2);
    assert_eq!(body["status"], "Active");
}

// =============================================================================
// Leaderboard, tickets, settings
// =============================================================================

#[tokio::test]
async fn test_leaderboard_publish_and_fetch() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        admin(
            "PUT",
            "/api/admin/leaderboard",
            Some(json!({
                "timeframe": "weekly",
                "top_affiliates": [
                    {"rank": 0, "tiktok_username": "bob", "total_gmv": 120.0,
                     "items_sold": 12, "orders": 10, "video_views": 4000},
                    {"rank": 0, "tiktok_username": "jane", "total_gmv": 900.0,
                     "items_sold": 80, "orders": 75, "video_views": 22000}
                ]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Re-ranked by GMV descending
    assert_eq!(body["top_affiliates"][0]["tiktok_username"], "jane");
    assert_eq!(body["top_affiliates"][0]["rank"], 1);

    let (status, body) = send(&app, affiliate("GET", "/api/leaderboard?timeframe=weekly", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_affiliates"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_ticket_flow() {
    let (app, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        affiliate("POST", "/api/tickets", Some(json!({"subject": "Payout missing"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Pending");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/tickets/{}/status", id),
            Some(json!({"status": "OnGoing"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OnGoing");

    // Another affiliate sees no tickets
    let (_, body) = send(&app, request_as("GET", "/api/tickets", "aff-2", "Affiliate", None)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_settings_version_bumps_via_api() {
    let (app, _db) = setup_app().await;

    let (_, body) = send(&app, affiliate("GET", "/api/settings", None)).await;
    assert_eq!(body["version"], 1);

    let (status, body) = send(
        &app,
        admin(
            "PUT",
            "/api/admin/settings",
            Some(json!({"discord_link": "https://discord.gg/hub"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 2);

    let (_, body) = send(
        &app,
        admin("PUT", "/api/admin/settings", Some(json!({"require_video_approval": false}))),
    )
    .await;
    assert_eq!(body["version"], 3);
    assert_eq!(body["require_video_approval"], false);

    // With review disabled, new submissions enter Approved
    let campaign_id = create_campaign(&app, 1000.0).await;
    let (_, body) = send(
        &app,
        affiliate(
            "POST",
            "/api/submissions",
            Some(json!({"campaign_id": campaign_id, "video_url": "https://tiktok.com/v/1"})),
        ),
    )
    .await;
    assert_eq!(body["status"], "Approved");
}
