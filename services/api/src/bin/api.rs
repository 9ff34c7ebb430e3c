//! services/api/src/bin/api.rs
//!
//! Service entrypoint: loads configuration, wires the chosen store backend
//! and the ingestion pipeline into shared state, and serves the router.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use api_lib::adapters::file_store::FileStore;
use api_lib::adapters::gemini::GeminiGenerator;
use api_lib::adapters::ocr_http::RemoteOcr;
use api_lib::adapters::pdf_renderer::PdfiumRenderer;
use api_lib::adapters::pg_store::PgStore;
use api_lib::config::{Config, IngestStrategy, StorageConfig};
use api_lib::error::ApiError;
use api_lib::pipeline::IngestionPipeline;
use api_lib::web;
use api_lib::web::state::{AdminAccount, AppState};
use lectern_core::ports::ContentStore;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string())),
        )
        .init();

    let store: Arc<dyn ContentStore> = match &config.storage {
        StorageConfig::Postgres { url } => {
            let store = PgStore::connect(url).await?;
            store.run_migrations().await?;
            info!("connected to postgres store");
            Arc::new(store)
        }
        StorageConfig::FlatFile { root } => {
            let store = FileStore::open(root.clone()).await?;
            info!(root = %root.display(), "opened flat-file store");
            Arc::new(store)
        }
    };

    let http = reqwest::Client::new();
    let generator = Arc::new(GeminiGenerator::new(
        http.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));

    let pipeline = match config.ingest_strategy {
        IngestStrategy::InlinePdf => IngestionPipeline::inline(generator),
        IngestStrategy::RenderOcr => {
            let endpoint = config
                .ocr_endpoint
                .clone()
                .ok_or_else(|| ApiError::Internal("OCR endpoint missing".to_string()))?;
            IngestionPipeline::with_ocr(
                generator,
                Arc::new(PdfiumRenderer),
                Arc::new(RemoteOcr::new(http, endpoint)),
            )
        }
    };

    // The plaintext admin password from the environment is hashed once here
    // and dropped; login verifies against the hash only.
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(config.admin_password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("failed to hash admin password: {e}")))?
        .to_string();
    let admin = AdminAccount {
        id: Uuid::new_v4(),
        username: config.admin_username.clone(),
        password_hash,
    };

    let static_dir = config.static_dir.display().to_string();
    let bind_address = config.bind_address;
    let state = Arc::new(AppState {
        store,
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
        admin,
    });

    let app = web::router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(address = %bind_address, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
