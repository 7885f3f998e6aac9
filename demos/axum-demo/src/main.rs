use std::sync::Arc;

use postern_core::services::AccessLinkMailerService;
use postern_core::{MagicLinkConfig, Postern};
use postern_storage_sqlite::SqliteTokenStore;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("info,axum_demo=debug,postern_core=debug,postern_storage_sqlite=debug")
        .init();

    info!("Starting Postern Axum Demo");

    // Connect to SQLite in-memory database and set up the token table.
    // An in-memory database exists per connection, so the pool stays at one.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = Arc::new(SqliteTokenStore::new(pool));
    store.migrate().await?;
    info!("Database migrations completed");

    // Without SENDGRID_API_KEY set, emails land as JSON files in ./emails
    let mailer = Arc::new(AccessLinkMailerService::from_env()?);

    // POSTERN_ALLOWED_DOMAIN / POSTERN_BASE_URL configure the policy;
    // fall back to local defaults so the demo runs out of the box
    let config = MagicLinkConfig::from_env()
        .unwrap_or_else(|_| MagicLinkConfig::new("example.com", "http://localhost:3000/signin"));
    info!(
        domain = %config.allowed_domain,
        ttl_minutes = config.token_ttl.num_minutes(),
        "Issuing links for one domain"
    );

    let postern = Arc::new(Postern::new(store, mailer, config));

    // Sweep expired tokens once a minute until shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweep_handle = postern.start_sweep_task(std::time::Duration::from_secs(60), shutdown_rx);

    let app = axum::Router::new().nest("/auth", postern_axum::create_router(postern));

    info!("Server starting on http://localhost:3000");
    info!("Available endpoints:");
    info!("  POST /auth/magic-link        - Request an access link");
    info!("  POST /auth/magic-link/verify - Redeem the token from a link");
    info!("  GET  /auth/health            - Health check");

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = shutdown_tx.send(true);
    sweep_handle.await?;

    Ok(())
}
