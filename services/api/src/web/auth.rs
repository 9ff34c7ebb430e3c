//! services/api/src/web/auth.rs
//!
//! Login and logout handlers for the single admin account.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use lectern_core::domain::{Role, SessionUser};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::web::middleware::SESSION_COOKIE;
use crate::web::pages;
use crate::web::state::AppState;
use crate::web::token::{self, SESSION_TTL_SECS};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_form() -> Html<String> {
    Html(pages::login_page(None))
}

/// Verifies the submitted credentials against the seeded admin account and,
/// on success, sets the session cookie and redirects to the dashboard.
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let admin = &state.admin;
    let credentials_ok = form.username == admin.username
        && PasswordHash::new(&admin.password_hash)
            .map(|hash| {
                Argon2::default()
                    .verify_password(form.password.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false);

    if !credentials_ok {
        warn!(username = %form.username, "failed login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Html(pages::login_page(Some("Invalid username or password"))),
        )
            .into_response();
    }

    let user = SessionUser {
        id: admin.id,
        username: admin.username.clone(),
        role: Role::Admin,
    };
    let jwt = token::issue(&user, &state.config.session_secret);
    info!(username = %user.username, "admin logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={jwt}; HttpOnly; Path=/; Max-Age={SESSION_TTL_SECS}; SameSite=Lax"
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
}

/// Clears the session cookie and returns to the login form.
pub async fn logout() -> Response {
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}
