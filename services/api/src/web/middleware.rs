//! services/api/src/web/middleware.rs
//!
//! Authentication and authorization middleware for protecting routes.
//!
//! Two stages run in order: `require_auth` verifies the session cookie and
//! attaches the decoded identity to the request, then `authorize` checks that
//! identity against the role set the route group was registered with. Failure
//! shaping depends on the path: browser-facing admin pages get a redirect to
//! the login form, API-shaped paths get a JSON error body.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use lectern_core::domain::{Role, SessionUser};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;
use crate::web::token;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Why a request was turned away before reaching its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No session cookie at all.
    Unauthenticated,
    /// A cookie was present but its token failed verification or expired.
    InvalidSession,
    /// A valid identity lacking the required role.
    Forbidden,
}

/// A finite, ordered set of roles a route group accepts.
///
/// Built once at router construction, never per-request.
#[derive(Debug, Clone)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut roles: Vec<Role> = roles.into_iter().collect();
        roles.sort();
        roles.dedup();
        Self(roles)
    }

    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self::new([role])
    }
}

/// Whether a path gets JSON errors instead of login redirects.
///
/// Upload endpoints are API-shaped even though they live under `/admin`.
pub fn is_api_path(path: &str) -> bool {
    path.ends_with("/upload")
}

/// Builds the response for a rejected request.
pub fn failure_response(path: &str, failure: AuthFailure) -> Response {
    if is_api_path(path) {
        let (status, message) = match failure {
            AuthFailure::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthFailure::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
            AuthFailure::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

/// Extracts and verifies the session cookie, yielding the request identity.
pub fn session_from_cookie_header(
    cookie_header: Option<&str>,
    secret: &str,
) -> Result<SessionUser, AuthFailure> {
    let header = cookie_header.ok_or(AuthFailure::Unauthenticated)?;
    let raw_token = header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("token="))
        .ok_or(AuthFailure::Unauthenticated)?;

    token::verify(raw_token, secret).map_err(|_| AuthFailure::InvalidSession)
}

/// Middleware that validates the session cookie and attaches the identity.
///
/// If valid, inserts the [`SessionUser`] into request extensions for handlers
/// and the role stage to use. If missing or invalid, rejects with a
/// path-appropriate response.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok());

    match session_from_cookie_header(cookie_header, &state.config.session_secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(failure) => {
            warn!(path = %req.uri().path(), ?failure, "rejected unauthenticated request");
            failure_response(req.uri().path(), failure)
        }
    }
}

/// Middleware that checks the attached identity against a role set.
///
/// Layered inside `require_auth`; an absent identity means the auth stage
/// never ran, which is treated the same as no session.
pub async fn authorize(roles: RoleSet, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    match req.extensions().get::<SessionUser>() {
        Some(user) if roles.permits(user.role) => next.run(req).await,
        Some(user) => {
            warn!(path = %path, username = %user.username, role = %user.role, "insufficient role");
            failure_response(&path, AuthFailure::Forbidden)
        }
        None => failure_response(&path, AuthFailure::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::domain::SessionUser;
    use uuid::Uuid;

    const SECRET: &str = "a-test-secret";

    fn cookie_for(role: Role) -> String {
        let user = SessionUser {
            id: Uuid::new_v4(),
            username: "someone".into(),
            role,
        };
        format!("token={}", token::issue(&user, SECRET))
    }

    #[test]
    fn upload_paths_are_api_shaped() {
        assert!(is_api_path("/admin/MA101/upload"));
        assert!(!is_api_path("/admin"));
        assert!(!is_api_path("/admin/edit-subject/MA101"));
    }

    #[test]
    fn page_paths_redirect_to_login() {
        let resp = failure_response("/admin", AuthFailure::Unauthenticated);
        assert!(resp.status().is_redirection());
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[test]
    fn api_paths_get_json_statuses() {
        let resp = failure_response("/admin/MA101/upload", AuthFailure::Unauthenticated);
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = failure_response("/admin/MA101/upload", AuthFailure::InvalidSession);
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = failure_response("/admin/MA101/upload", AuthFailure::Forbidden);
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_cookie_is_unauthenticated() {
        assert_eq!(
            session_from_cookie_header(None, SECRET).unwrap_err(),
            AuthFailure::Unauthenticated
        );
        assert_eq!(
            session_from_cookie_header(Some("other=1"), SECRET).unwrap_err(),
            AuthFailure::Unauthenticated
        );
    }

    #[test]
    fn bad_token_is_invalid_session() {
        assert_eq!(
            session_from_cookie_header(Some("token=garbage"), SECRET).unwrap_err(),
            AuthFailure::InvalidSession
        );
    }

    #[test]
    fn valid_cookie_decodes_identity() {
        let cookie = cookie_for(Role::Admin);
        let user = session_from_cookie_header(Some(&cookie), SECRET).unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn role_set_normalizes_duplicates() {
        let set = RoleSet::new([Role::Admin, Role::Admin, Role::User]);
        assert!(set.permits(Role::Admin));
        assert!(set.permits(Role::User));

        let admin_only: RoleSet = Role::Admin.into();
        assert!(!admin_only.permits(Role::User));
    }
}
