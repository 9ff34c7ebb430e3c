//! services/api/src/web/admin.rs
//!
//! Admin handlers: subject CRUD pages and the PDF upload endpoint.
//!
//! All routes here sit behind the auth and role middleware. Page handlers
//! respond with rendered HTML and redirects; the upload endpoint is
//! API-shaped and responds with JSON for the in-page upload form.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use lectern_core::domain::Unit;
use lectern_core::normalize_code;
use lectern_core::ports::StoreError;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::pipeline::PipelineError;
use crate::web::pages;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct AddSubjectForm {
    #[serde(rename = "subjectName")]
    pub subject_name: String,
    #[serde(rename = "subjectCode")]
    pub subject_code: String,
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_subjects().await {
        Ok(subjects) => Html(pages::dashboard_page(&subjects, None)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to list subjects");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::dashboard_page(&[], Some("Could not load subjects"))),
            )
                .into_response()
        }
    }
}

pub async fn add_subject(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddSubjectForm>,
) -> Response {
    let name = form.subject_name.trim().to_string();
    let code = normalize_code(&form.subject_code);
    if name.is_empty() || code.is_empty() {
        return dashboard_with_error(&state, "Subject name and code are required").await;
    }

    match state.store.create_subject(&name, &code).await {
        Ok(_) => {
            info!(%code, "subject created");
            Redirect::to("/admin").into_response()
        }
        Err(StoreError::DuplicateCode(_)) => {
            dashboard_with_error(&state, "A subject with that code already exists").await
        }
        Err(e) => {
            error!(error = %e, %code, "failed to create subject");
            dashboard_with_error(&state, "Could not create subject").await
        }
    }
}

async fn dashboard_with_error(state: &AppState, message: &str) -> Response {
    let subjects = state.store.list_subjects().await.unwrap_or_default();
    (
        StatusCode::BAD_REQUEST,
        Html(pages::dashboard_page(&subjects, Some(message))),
    )
        .into_response()
}

pub async fn edit_subject_form(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.store.get_subject(&code).await {
        Ok(subject) => Html(pages::edit_subject_page(&subject)).into_response(),
        Err(StoreError::NotFound(_)) => subject_not_found(&code),
        Err(e) => {
            error!(error = %e, %code, "failed to load subject");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Applies the edit form. Unit titles arrive as `unit1_title` .. `unitN_title`
/// inputs; a blank or missing input falls back to the default "Unit N" title.
pub async fn edit_subject_submit(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let existing = match state.store.get_subject(&code).await {
        Ok(subject) => subject,
        Err(StoreError::NotFound(_)) => return subject_not_found(&code),
        Err(e) => {
            error!(error = %e, %code, "failed to load subject");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let name = form
        .get("subjectName")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(existing.name.as_str())
        .to_string();
    let new_code = form
        .get("subjectCode")
        .map(|s| normalize_code(s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| existing.code.clone());

    let units: Vec<Unit> = existing
        .units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let n = i + 1;
            let title = form
                .get(&format!("unit{n}_title"))
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Unit {n}"));
            Unit {
                id: unit.id.clone(),
                title,
            }
        })
        .collect();

    match state
        .store
        .update_subject(&code, &name, &new_code, units)
        .await
    {
        Ok(_) => {
            info!(%code, %new_code, "subject updated");
            Redirect::to("/admin").into_response()
        }
        Err(StoreError::NotFound(_)) => subject_not_found(&code),
        Err(StoreError::DuplicateCode(_)) => (
            StatusCode::BAD_REQUEST,
            Html(pages::edit_subject_page(&existing)),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, %code, "failed to update subject");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.store.delete_subject(&code).await {
        Ok(()) => {
            info!(%code, "subject deleted");
            Redirect::to("/admin").into_response()
        }
        Err(StoreError::NotFound(_)) => subject_not_found(&code),
        Err(e) => {
            error!(error = %e, %code, "failed to delete subject");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn subject_admin(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    let subject = match state.store.get_subject(&code).await {
        Ok(subject) => subject,
        Err(StoreError::NotFound(_)) => return subject_not_found(&code),
        Err(e) => {
            error!(error = %e, %code, "failed to load subject");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let lectures = state
        .store
        .list_lectures(&subject.code)
        .await
        .unwrap_or_default();
    Html(pages::subject_admin_page(&subject, &lectures)).into_response()
}

/// Accepts the multipart upload (`pdfFile`, `title`, `unit`) and runs the
/// ingestion pipeline. Responses are JSON since the page submits via fetch.
pub async fn upload_lecture(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut pdf: Option<Vec<u8>> = None;
    let mut title = String::new();
    let mut unit = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Malformed upload request." })),
                )
                    .into_response();
            }
        };
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("pdfFile") => match field.bytes().await {
                Ok(bytes) => pdf = Some(bytes.to_vec()),
                Err(e) => {
                    warn!(error = %e, "failed reading uploaded file");
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "Malformed upload request." })),
                    )
                        .into_response();
                }
            },
            Some("title") => title = field.text().await.unwrap_or_default(),
            Some("unit") => unit = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    match state
        .pipeline
        .ingest(state.store.as_ref(), &code, &unit, &title, pdf)
        .await
    {
        Ok(receipt) => Json(json!({
            "success": true,
            "message": format!("Lecture '{}' was created successfully!", receipt.title),
        }))
        .into_response(),
        Err(e) => upload_error_response(e),
    }
}

fn upload_error_response(err: PipelineError) -> Response {
    match err {
        PipelineError::MissingFile => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No file uploaded." })),
        )
            .into_response(),
        PipelineError::EmptyTitle
        | PipelineError::UnknownSubject(_)
        | PipelineError::UnknownUnit { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        PipelineError::Persistence(StoreError::DuplicateLecture { .. }) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "A lecture with that title already exists." })),
        )
            .into_response(),
        other => {
            error!(error = %other, "lecture ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to process PDF with AI.",
                })),
            )
                .into_response()
        }
    }
}

fn subject_not_found(code: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found_page(&format!(
            "No subject with code {code}"
        ))),
    )
        .into_response()
}
