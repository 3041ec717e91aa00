// src/bin/broker.rs

use clap::Parser;
use pactum::infra::config::{self, StorageBackend};
use pactum::infra::telemetry;
use pactum::storage::{ContractStore, FsObjectStore, MemoryContractStore, ObjectContractStore};
use pactum::transport;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Contract broker: stores published contracts and verification results and
/// answers can-i-deploy queries.
#[derive(Parser)]
#[command(name = "pactum-broker", version)]
struct Cli {
    /// Listen address (falls back to PACTUM_BROKER_ADDR)
    #[arg(long)]
    addr: Option<String>,
    /// `memory` or `fs` (falls back to PACTUM_STORAGE)
    #[arg(long)]
    storage: Option<StorageBackend>,
    /// Root directory of the fs backend (falls back to PACTUM_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Bearer token required on every route but /health (falls back to PACTUM_BROKER_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    telemetry::init_tracing("info", config::log_json());
    let cli = Cli::parse();

    // --- Contract store ---
    let backend = match cli.storage {
        Some(b) => b,
        None => config::storage_backend()?,
    };
    let store: Arc<dyn ContractStore> = match backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory contract store (contents are lost on restart)");
            Arc::new(MemoryContractStore::new())
        }
        StorageBackend::Fs => {
            let dir = cli.data_dir.unwrap_or_else(config::data_dir);
            tracing::info!(data_dir = %dir.display(), "using filesystem contract store");
            Arc::new(ObjectContractStore::new(FsObjectStore::new(dir)))
        }
    };

    let token = cli.token.or_else(config::broker_token);
    if token.is_none() {
        tracing::warn!("no broker token configured; API is unauthenticated");
    }
    let mut app_state = transport::http::AppState::new(store);
    if let Some(token) = token {
        app_state = app_state.with_api_token(token);
    }

    // --- API server ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = cli.addr.unwrap_or_else(config::broker_addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "broker listening (Swagger UI at /swagger-ui)");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
