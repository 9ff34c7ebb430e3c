//! crates/lectern_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases,
//! the filesystem, or remote AI/OCR services.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::{Lecture, LectureSummary, NewLecture, Subject, Unit};

//=========================================================================================
// Content Store
//=========================================================================================

/// Errors surfaced by any content store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Subject code already exists: {0}")]
    DuplicateCode(String),
    #[error("Lecture id already exists in subject: {0}")]
    DuplicateLecture(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The persistence port for subjects and lectures.
///
/// Two backends implement this: a Postgres store and a flat-file store
/// (JSON subject map plus one append-only HTML file per subject). Both
/// enforce the same invariants: unique subject codes, unique lecture ids
/// within a subject, and cascade deletion of a subject's lectures.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>>;

    async fn get_subject(&self, code: &str) -> StoreResult<Subject>;

    /// Creates a subject seeded with the six default units.
    async fn create_subject(&self, name: &str, code: &str) -> StoreResult<Subject>;

    /// Full replace of name, code, and units. When the code changes, the
    /// subject's lectures are re-keyed to the new code in the same operation.
    async fn update_subject(
        &self,
        code: &str,
        name: &str,
        new_code: &str,
        units: Vec<Unit>,
    ) -> StoreResult<Subject>;

    /// Deletes a subject and every lecture it owns.
    async fn delete_subject(&self, code: &str) -> StoreResult<()>;

    async fn list_lectures(&self, subject_code: &str) -> StoreResult<Vec<LectureSummary>>;

    /// The subject's earliest lecture by creation order, if any.
    async fn first_lecture(&self, subject_code: &str) -> StoreResult<Option<LectureSummary>>;

    async fn get_lecture(&self, subject_code: &str, lecture_id: &str) -> StoreResult<Lecture>;

    /// Persists a freshly generated lecture. A duplicate lecture id within
    /// the subject is rejected with [`StoreError::DuplicateLecture`].
    async fn append_lecture(&self, lecture: NewLecture) -> StoreResult<Lecture>;

    async fn count_lectures(&self, subject_code: &str) -> StoreResult<usize>;
}

//=========================================================================================
// Generative AI
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No AI credential is configured; the pipeline fails fast before any call.
    #[error("AI service credential is not configured")]
    Unconfigured,
    #[error("AI service call failed: {0}")]
    Service(String),
    #[error("AI service returned an empty or unparsable response")]
    EmptyResponse,
}

/// A document attached inline to a generation request (strategy A).
#[derive(Debug, Clone)]
pub struct PdfAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl PdfAttachment {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "application/pdf",
        }
    }
}

/// The generative-AI port: prompt in, raw model text out.
#[async_trait]
pub trait LectureGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&PdfAttachment>,
    ) -> Result<String, GeneratorError>;
}

//=========================================================================================
// OCR and page rendering (strategy B)
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR service call failed: {0}")]
    Service(String),
    #[error("Could not read page image: {0}")]
    Io(String),
}

/// Optical character recognition over one page image.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF could not be parsed: {0}")]
    BadDocument(String),
    #[error("Rasterisation failed for page {page}: {detail}")]
    Page { page: usize, detail: String },
    #[error("Could not write page image: {0}")]
    Io(String),
}

/// Renders every page of a PDF to an image file in the given directory.
///
/// Each produced filename embeds the zero-based page index (`page-{n}.png`);
/// callers must sort on the parsed index, not lexically, since `page-10`
/// sorts before `page-2` as text.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_to_dir(&self, pdf: &[u8], dir: &Path) -> Result<Vec<PathBuf>, RenderError>;
}
