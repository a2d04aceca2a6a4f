use anyhow::Context;
use env_logger::Builder;
use log::LevelFilter;
use object_tags::api::routes::create_router;
use object_tags::config::AppConfig;
use object_tags::store::PostgresTagStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let store = connect(&config).await?;

    let app = create_router::<PostgresTagStore>().with_state(Arc::new(store));
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    log::info!("Tag service listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Tag service stopped");
    Ok(())
}

/// `RUST_LOG` overrides the defaults; sqlx statement logging stays at warn
fn init_logging() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();
}

async fn connect(config: &AppConfig) -> anyhow::Result<PostgresTagStore> {
    let database_url = config.database_url()?;
    log::info!(
        "Connecting to tag database (max {} connections)",
        config.max_connections()
    );
    let store = PostgresTagStore::new(&database_url, config.max_connections())
        .await
        .context("Failed to create PostgreSQL connection pool")?;

    store
        .migrate()
        .await
        .context("Failed to run tag table migrations")?;
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested, draining connections");
}
