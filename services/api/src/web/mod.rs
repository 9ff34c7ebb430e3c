//! services/api/src/web/mod.rs
//!
//! HTTP surface: route table, auth middleware wiring, and static assets.

pub mod admin;
pub mod auth;
pub mod middleware;
pub mod pages;
pub mod public;
pub mod state;
pub mod token;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lectern_core::domain::Role;
use std::sync::Arc;
use tower_http::services::ServeDir;

use middleware::{authorize, require_auth, RoleSet};
use state::AppState;

/// Uploads carry a whole PDF; cap the body well above typical lecture decks.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Builds the application router.
///
/// Static segments win over captures, so `/admin`, `/login`, and `/static`
/// are never shadowed by the `/{code}` subject route.
pub fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    let admin_roles = RoleSet::from(Role::Admin);

    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/add-subject", post(admin::add_subject))
        .route(
            "/admin/edit-subject/{code}",
            get(admin::edit_subject_form).post(admin::edit_subject_submit),
        )
        .route("/admin/delete-subject/{code}", post(admin::delete_subject))
        .route("/admin/{code}", get(admin::subject_admin))
        .route("/admin/{code}/upload", post(admin::upload_lecture))
        // Role check runs after session validation attaches the identity.
        .route_layer(from_fn(move |req, next| {
            authorize(admin_roles.clone(), req, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(public::index))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .merge(admin_routes)
        .route("/{code}", get(public::subject_home))
        .route("/{code}/lectures/{lecture_id}", get(public::lecture_view))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
