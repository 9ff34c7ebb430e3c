//! services/api/src/web/public.rs
//!
//! Public, unauthenticated pages: the subject listing and the lecture reader.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use lectern_core::group_by_unit;
use lectern_core::ports::StoreError;
use std::sync::Arc;
use tracing::error;

use crate::web::pages;
use crate::web::state::AppState;

/// The landing page: every subject with its lecture count.
///
/// Store failures degrade to an empty listing rather than an error page.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let subjects = match state.store.list_subjects().await {
        Ok(subjects) => subjects,
        Err(e) => {
            error!(error = %e, "failed to list subjects");
            Vec::new()
        }
    };

    let mut entries = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let count = state
            .store
            .count_lectures(&subject.code)
            .await
            .unwrap_or(0);
        entries.push((subject, count));
    }
    Html(pages::subjects_page(&entries))
}

/// Entry point for a subject: redirects to its earliest lecture, or shows a
/// welcome placeholder when the subject has no lectures yet.
pub async fn subject_home(
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

    match state.store.first_lecture(&subject.code).await {
        Ok(Some(lecture)) => {
            Redirect::to(&format!("/{}/lectures/{}", subject.code, lecture.lecture_id))
                .into_response()
        }
        Ok(None) => {
            let welcome = pages::welcome_fragment(&subject.name);
            Html(pages::lecture_page(&subject, &[], "", &welcome)).into_response()
        }
        Err(e) => {
            error!(error = %e, %code, "failed to load first lecture");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Renders one lecture with the full sidebar. An unknown lecture id under a
/// known subject keeps the sidebar and shows a placeholder body with a 404.
pub async fn lecture_view(
    State(state): State<Arc<AppState>>,
    Path((code, lecture_id)): Path<(String, String)>,
) -> Response {
    let subject = match state.store.get_subject(&code).await {
        Ok(subject) => subject,
        Err(StoreError::NotFound(_)) => return subject_not_found(&code),
        Err(e) => {
            error!(error = %e, %code, "failed to load subject");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let summaries = match state.store.list_lectures(&subject.code).await {
        Ok(summaries) => summaries,
        Err(e) => {
            error!(error = %e, %code, "failed to list lectures");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let grouped = group_by_unit(&subject.units, &summaries);

    match state.store.get_lecture(&subject.code, &lecture_id).await {
        Ok(lecture) => Html(pages::lecture_page(
            &subject,
            &grouped,
            &lecture.lecture_id,
            &lecture.html_content,
        ))
        .into_response(),
        Err(StoreError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Html(pages::lecture_page(
                &subject,
                &grouped,
                &lecture_id,
                pages::lecture_missing_fragment(),
            )),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, %code, %lecture_id, "failed to load lecture");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
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
