use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use redmane_api::config::AppConfig;
use redmane_api::database::{CatalogData, CatalogStore, DatabaseManager, PgCatalog, SqliteCatalog};
use redmane_api::services::CatalogService;

#[derive(Debug, Parser)]
#[command(name = "redmane-api", version, about = "REDMANE research data catalog API")]
struct Args {
    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Env file to load instead of config.env / .env
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Serve a JSON catalog fixture from an in-memory SQLite database instead of PostgreSQL
    #[arg(long, value_name = "FILE", conflicts_with = "init_schema")]
    fixture: Option<PathBuf>,

    /// Create missing catalog tables in PostgreSQL before serving
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let mut config = AppConfig::load(args.env_file.as_deref());
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting REDMANE catalog API in {:?} mode", config.environment);

    let store: Arc<dyn CatalogStore> = match &args.fixture {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read fixture {}", path.display()))?;
            let data = CatalogData::from_json(&raw)
                .with_context(|| format!("failed to parse fixture {}", path.display()))?;
            let catalog = SqliteCatalog::with_data(&data)
                .await
                .with_context(|| format!("failed to load fixture {}", path.display()))?;
            tracing::info!("Serving in-memory catalog from {}", path.display());
            Arc::new(catalog)
        }
        None => {
            let pool = DatabaseManager::pool(&config.database).context("failed to configure database pool")?;
            let catalog = PgCatalog::new(pool);
            if args.init_schema {
                catalog.apply_schema().await.context("failed to apply catalog schema")?;
            }
            match catalog.missing_tables().await {
                Ok(missing) if missing.is_empty() => tracing::info!("All catalog tables present"),
                Ok(missing) => tracing::warn!("Catalog tables missing from database: {}", missing.join(", ")),
                Err(e) => tracing::warn!("Could not inspect database schema: {}", e),
            }
            Arc::new(catalog)
        }
    };

    let app = redmane_api::app(CatalogService::new(store), &config.api);

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("REDMANE catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
