//! Database initialization
//!
//! Creates the SQLite database on first run with the full schema and default
//! settings. All schema statements are idempotent (CREATE TABLE IF NOT EXISTS)
//! so init is safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Wait out short-lived write locks instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent). Also used directly by tests against
/// in-memory pools.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_settings_table(pool).await?;
    create_reward_campaigns_table(pool).await?;
    create_submissions_table(pool).await?;
    create_sample_campaigns_table(pool).await?;
    create_sample_requests_table(pool).await?;
    create_incentives_table(pool).await?;
    create_incentive_participants_table(pool).await?;
    create_leaderboards_table(pool).await?;
    create_tickets_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT,
            tiktok_username TEXT,
            role TEXT NOT NULL DEFAULT 'Affiliate',
            status TEXT NOT NULL DEFAULT 'Verified',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_reward_campaigns_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reward_campaigns (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            payout_rate REAL NOT NULL,
            total_budget REAL NOT NULL,
            total_paid_out REAL NOT NULL DEFAULT 0,
            participant_count INTEGER NOT NULL DEFAULT 0,
            total_views INTEGER NOT NULL DEFAULT 0,
            minimum_payout REAL NOT NULL DEFAULT 0,
            maximum_payout REAL NOT NULL DEFAULT 0,
            platforms TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'Active',
            requirements TEXT NOT NULL DEFAULT '[]',
            assets TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL REFERENCES reward_campaigns(id),
            affiliate_id TEXT NOT NULL,
            affiliate_handle TEXT NOT NULL,
            video_url TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PendingReview',
            rejection_reason TEXT,
            submitted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            approved_at TIMESTAMP,
            screenshot_url TEXT,
            final_view_count INTEGER,
            calculated_earnings REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_campaign ON submissions(campaign_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_affiliate ON submissions(affiliate_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sample_campaigns_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sample_campaigns (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            product_url TEXT NOT NULL DEFAULT '',
            order_link TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sample_requests_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sample_requests (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            campaign_name TEXT NOT NULL,
            affiliate_id TEXT NOT NULL,
            affiliate_handle TEXT NOT NULL,
            video_url TEXT NOT NULL DEFAULT '',
            ad_code TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'PendingApproval',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sample_requests_affiliate ON sample_requests(affiliate_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_incentives_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incentives (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            rules TEXT NOT NULL DEFAULT '[]',
            rewards TEXT NOT NULL DEFAULT '',
            start_date TIMESTAMP NOT NULL,
            end_date TIMESTAMP NOT NULL,
            min_affiliates INTEGER NOT NULL DEFAULT 0,
            joined_affiliates INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'Pending'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_incentive_participants_table(pool: &SqlitePool) -> Result<()> {
    // Composite key makes joining idempotent per affiliate
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incentive_participants (
            incentive_id TEXT NOT NULL REFERENCES incentives(id),
            affiliate_id TEXT NOT NULL,
            joined_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (incentive_id, affiliate_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_leaderboards_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leaderboards (
            timeframe TEXT PRIMARY KEY,
            date TIMESTAMP NOT NULL,
            entries TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tickets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id TEXT PRIMARY KEY,
            affiliate_id TEXT NOT NULL,
            affiliate_handle TEXT NOT NULL,
            subject TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize default settings (idempotent)
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Settings record version (bumped on every settings write)
    ensure_setting(pool, "settings_version", "1").await?;

    // Submission review behavior
    ensure_setting(pool, "require_video_approval", "true").await?;

    // Community links
    ensure_setting(pool, "discord_link", "").await?;
    ensure_setting(pool, "facebook_group_link", "").await?;
    ensure_setting(pool, "tiktok_showcase_link", "").await?;
    ensure_setting(pool, "youtube_tutorial_link", "").await?;

    // Content rewards page header
    ensure_setting(pool, "content_rewards_header", "Content Rewards").await?;
    ensure_setting(pool, "content_rewards_subtext", "").await?;
    ensure_setting(pool, "content_rewards_learn_more_url", "").await?;

    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization races
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        info!("Reset NULL setting '{}' to default value: {}", key, default_value);
    }

    Ok(())
}
