//! Global settings stored in the database
//!
//! Settings live in the key/value `settings` table and carry a monotonic
//! `settings_version` bumped on every write. Handlers load a fresh snapshot
//! per request rather than caching ambient global state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Versioned settings snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub version: i64,
    pub require_video_approval: bool,
    pub discord_link: String,
    pub facebook_group_link: String,
    pub tiktok_showcase_link: String,
    pub youtube_tutorial_link: String,
    pub content_rewards_header: String,
    pub content_rewards_subtext: String,
    pub content_rewards_learn_more_url: String,
}

/// Fields an update may change (version is server-managed)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub require_video_approval: Option<bool>,
    pub discord_link: Option<String>,
    pub facebook_group_link: Option<String>,
    pub tiktok_showcase_link: Option<String>,
    pub youtube_tutorial_link: Option<String>,
    pub content_rewards_header: Option<String>,
    pub content_rewards_subtext: Option<String>,
    pub content_rewards_learn_more_url: Option<String>,
}

async fn get_setting(pool: &SqlitePool, key: &str) -> Result<String> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?
        .flatten();

    value.ok_or_else(|| Error::Internal(format!("missing setting: {}", key)))
}

/// Load the current settings snapshot
pub async fn load_settings(pool: &SqlitePool) -> Result<GlobalSettings> {
    let version: i64 = get_setting(pool, "settings_version")
        .await?
        .parse()
        .map_err(|_| Error::Internal("settings_version is not an integer".to_string()))?;

    Ok(GlobalSettings {
        version,
        require_video_approval: get_setting(pool, "require_video_approval").await? == "true",
        discord_link: get_setting(pool, "discord_link").await?,
        facebook_group_link: get_setting(pool, "facebook_group_link").await?,
        tiktok_showcase_link: get_setting(pool, "tiktok_showcase_link").await?,
        youtube_tutorial_link: get_setting(pool, "youtube_tutorial_link").await?,
        content_rewards_header: get_setting(pool, "content_rewards_header").await?,
        content_rewards_subtext: get_setting(pool, "content_rewards_subtext").await?,
        content_rewards_learn_more_url: get_setting(pool, "content_rewards_learn_more_url").await?,
    })
}

/// Apply an update and bump the version, all in one transaction
///
/// Returns the post-update snapshot carrying the new version.
pub async fn update_settings(pool: &SqlitePool, update: SettingsUpdate) -> Result<GlobalSettings> {
    let mut tx = pool.begin().await?;

    async fn set(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        key: &str,
        value: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?")
            .bind(value)
            .bind(key)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    if let Some(v) = update.require_video_approval {
        set(&mut tx, "require_video_approval", if v { "true" } else { "false" }).await?;
    }
    if let Some(v) = &update.discord_link {
        set(&mut tx, "discord_link", v).await?;
    }
    if let Some(v) = &update.facebook_group_link {
        set(&mut tx, "facebook_group_link", v).await?;
    }
    if let Some(v) = &update.tiktok_showcase_link {
        set(&mut tx, "tiktok_showcase_link", v).await?;
    }
    if let Some(v) = &update.youtube_tutorial_link {
        set(&mut tx, "youtube_tutorial_link", v).await?;
    }
    if let Some(v) = &update.content_rewards_header {
        set(&mut tx, "content_rewards_header", v).await?;
    }
    if let Some(v) = &update.content_rewards_subtext {
        set(&mut tx, "content_rewards_subtext", v).await?;
    }
    if let Some(v) = &update.content_rewards_learn_more_url {
        set(&mut tx, "content_rewards_learn_more_url", v).await?;
    }

    // Atomic version bump; concurrent writers serialize on the row
    sqlx::query(
        "UPDATE settings SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT), \
         updated_at = CURRENT_TIMESTAMP WHERE key = 'settings_version'",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    load_settings(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        // Single connection: each in-memory connection is its own database
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::create_schema(&pool).await.unwrap();
        crate::db::init_default_settings(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_defaults_load() {
        let pool = test_pool().await;
        let settings = load_settings(&pool).await.unwrap();
        assert_eq!(settings.version, 1);
        assert!(settings.require_video_approval);
        assert_eq!(settings.discord_link, "");
    }

    #[tokio::test]
    async fn test_version_bumps_on_every_write() {
        let pool = test_pool().await;

        let s1 = update_settings(
            &pool,
            SettingsUpdate {
                discord_link: Some("https://discord.gg/hub".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(s1.version, 2);
        assert_eq!(s1.discord_link, "https://discord.gg/hub");

        // Empty update still bumps the version
        let s2 = update_settings(&pool, SettingsUpdate::default()).await.unwrap();
        assert_eq!(s2.version, 3);
        assert_eq!(s2.discord_link, "https://discord.gg/hub");
    }

    #[tokio::test]
    async fn test_toggle_require_video_approval() {
        let pool = test_pool().await;

        let s = update_settings(
            &pool,
            SettingsUpdate {
                require_video_approval: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!s.require_video_approval);
    }
}
