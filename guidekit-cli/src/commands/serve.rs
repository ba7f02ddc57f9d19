//! HTTP server command for the staging review API

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use guidekit_core::ImagePolicyConfig;
use guidekit_server::db::repos::memory::NewStagingItem;
use guidekit_server::db::{create_pool, migrations};
use guidekit_server::{run_server, AppState, MemoryStagingStore, PgStagingRepo, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep the staging queue in memory instead of Postgres (local UI work).
    /// Takes precedence over --database-url
    #[arg(long)]
    pub in_memory: bool,

    /// JSON file of `[{"title": ..., "raw_content": {...}}]` to preload (requires --in-memory)
    #[arg(long, requires = "in_memory")]
    pub seed: Option<PathBuf>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let policy = ImagePolicyConfig::from_env();
    tracing::info!(
        mode = %policy.validation_mode(),
        min_width = policy.min_width,
        min_file_kb = policy.min_file_kb,
        skip_head_for_trusted = policy.skip_head_for_trusted,
        "Image policy loaded"
    );

    let state = if args.in_memory {
        let store = MemoryStagingStore::new();
        if let Some(path) = &args.seed {
            let seeded = seed_store(&store, path).await?;
            tracing::info!("Seeded {} staging items from {}", seeded, path.display());
        }
        tracing::warn!("Using in-memory staging store; reviews are lost on exit");
        AppState::new(Arc::new(store))
    } else {
        let database_url = args.database_url.context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.guidekit/.env",
        )?;

        let pool = create_pool(&database_url)
            .await
            .context("Failed to create database pool")?;
        migrations::run(&pool)
            .await
            .context("Failed to run staging migrations")?;

        AppState::new(Arc::new(PgStagingRepo::new(pool)))
    };

    tracing::info!("Starting guidekit server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}

async fn seed_store(store: &MemoryStagingStore, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    let items: Vec<NewStagingItem> =
        serde_json::from_str(&content).context("Seed file must be a JSON array of items")?;

    let count = items.len();
    for item in items {
        store.insert(item).await;
    }
    Ok(count)
}
