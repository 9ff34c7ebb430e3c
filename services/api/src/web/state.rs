//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::pipeline::IngestionPipeline;
use lectern_core::ports::ContentStore;
use std::sync::Arc;
use uuid::Uuid;

/// The single admin account, seeded from the environment at startup.
///
/// The password is argon2-hashed immediately at boot; the plaintext is never
/// held beyond `Config`.
#[derive(Clone)]
pub struct AdminAccount {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub pipeline: Arc<IngestionPipeline>,
    pub config: Arc<Config>,
    pub admin: AdminAccount,
}
