//! hub-server - Creator Hub HTTP service
//!
//! Single binary serving the affiliate and admin API. Zero-config startup:
//! the root folder resolves from CLI flag, environment, config file, or the
//! OS default, and the database is created with its schema on first run.

use anyhow::Result;
use clap::Parser;
use hub_common::events::EventBus;
use hub_server::{build_router, AppState};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hub-server", about = "Creator Hub API server")]
struct Args {
    /// Root folder holding the database (overrides HUB_ROOT_FOLDER and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, env = "HUB_PORT", default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!("Starting Creator Hub server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder =
        hub_common::config::resolve_root_folder(args.root_folder.as_deref(), "HUB_ROOT_FOLDER")?;
    std::fs::create_dir_all(&root_folder)?;

    let db_path = hub_common::config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = hub_common::db::init_database(&db_path).await?;

    let events = Arc::new(EventBus::new(1000));
    let state = AppState::new(pool, events);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("hub-server listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
