//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which content store backend to run against.
#[derive(Clone, Debug)]
pub enum StorageConfig {
    /// Postgres-backed store; carries the connection string.
    Postgres { url: String },
    /// Flat-file store rooted at the given data directory.
    FlatFile { root: PathBuf },
}

/// How the ingestion pipeline acquires text from an uploaded PDF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestStrategy {
    /// Inline the PDF bytes into the generation call (no local OCR).
    InlinePdf,
    /// Render pages to images and OCR them before the generation call.
    RenderOcr,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub storage: StorageConfig,
    pub static_dir: PathBuf,
    pub session_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub ingest_strategy: IngestStrategy,
    pub ocr_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Storage Settings ---
        let storage_kind = std::env::var("STORAGE").unwrap_or_else(|_| "file".to_string());
        let storage = match storage_kind.as_str() {
            "postgres" => {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
                StorageConfig::Postgres { url }
            }
            "file" => {
                let root = std::env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data"));
                StorageConfig::FlatFile { root }
            }
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE".to_string(),
                    format!("'{}' is not one of: postgres, file", other),
                ))
            }
        };

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public"));

        // --- Load Auth Settings ---
        let session_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        let admin_username =
            std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::MissingVar("ADMIN_PASSWORD".to_string()))?;

        // --- Load Pipeline Settings ---
        // The API key is optional at startup; uploads fail with a
        // configuration error until it is provided.
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let gemini_model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string());

        let strategy_str =
            std::env::var("INGEST_STRATEGY").unwrap_or_else(|_| "inline".to_string());
        let ingest_strategy = match strategy_str.as_str() {
            "inline" => IngestStrategy::InlinePdf,
            "ocr" => IngestStrategy::RenderOcr,
            other => {
                return Err(ConfigError::InvalidValue(
                    "INGEST_STRATEGY".to_string(),
                    format!("'{}' is not one of: inline, ocr", other),
                ))
            }
        };

        let ocr_endpoint = std::env::var("OCR_ENDPOINT").ok();
        if ingest_strategy == IngestStrategy::RenderOcr && ocr_endpoint.is_none() {
            return Err(ConfigError::MissingVar("OCR_ENDPOINT".to_string()));
        }

        Ok(Self {
            bind_address,
            log_level,
            storage,
            static_dir,
            session_secret,
            admin_username,
            admin_password,
            gemini_api_key,
            gemini_model,
            ingest_strategy,
            ocr_endpoint,
        })
    }
}
