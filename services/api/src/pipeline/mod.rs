//! services/api/src/pipeline/mod.rs
//!
//! The PDF ingestion pipeline: uploaded PDF plus metadata in, a normalized
//! HTML fragment committed to the content store out.
//!
//! Stages run strictly in order and any failure aborts the whole operation:
//! text acquisition, identifier derivation, prompt construction, the
//! generation call, fence normalization, and the store commit. Temporary page
//! images live in a per-request directory that is removed on every exit path;
//! a failed removal is logged and never changes the outcome.

pub mod normalize;
pub mod prompt;

use lectern_core::domain::NewLecture;
use lectern_core::ports::{
    ContentStore, GeneratorError, LectureGenerator, OcrService, PageRenderer, PdfAttachment,
    StoreError,
};
use lectern_core::slug::lecture_id_from_title;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::IngestStrategy;

/// Errors raised by the ingestion pipeline, one per failure point.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Lecture title must not be empty")]
    EmptyTitle,
    #[error("Subject not found: {0}")]
    UnknownSubject(String),
    #[error("Unit '{unit}' does not exist in subject {subject}")]
    UnknownUnit { subject: String, unit: String },
    #[error("AI service credential is not configured")]
    Configuration,
    #[error("PDF conversion failed: {0}")]
    Conversion(String),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("AI service failed: {0}")]
    AiService(String),
    #[error("Could not persist lecture: {0}")]
    Persistence(#[from] StoreError),
}

/// Confirmation returned to the upload handler on success.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub lecture_id: String,
    pub title: String,
}

/// Orchestrates one upload end to end. Holds only service ports; all state
/// for a given upload is request-scoped.
pub struct IngestionPipeline {
    generator: Arc<dyn LectureGenerator>,
    renderer: Option<Arc<dyn PageRenderer>>,
    ocr: Option<Arc<dyn OcrService>>,
    strategy: IngestStrategy,
}

impl IngestionPipeline {
    /// Strategy A: the PDF is inlined into the generation call.
    pub fn inline(generator: Arc<dyn LectureGenerator>) -> Self {
        Self {
            generator,
            renderer: None,
            ocr: None,
            strategy: IngestStrategy::InlinePdf,
        }
    }

    /// Strategy B: pages are rendered to images and OCRed first.
    pub fn with_ocr(
        generator: Arc<dyn LectureGenerator>,
        renderer: Arc<dyn PageRenderer>,
        ocr: Arc<dyn OcrService>,
    ) -> Self {
        Self {
            generator,
            renderer: Some(renderer),
            ocr: Some(ocr),
            strategy: IngestStrategy::RenderOcr,
        }
    }

    /// Runs the full pipeline for one uploaded PDF.
    pub async fn ingest(
        &self,
        store: &dyn ContentStore,
        subject_code: &str,
        unit_id: &str,
        title: &str,
        pdf: Option<Vec<u8>>,
    ) -> Result<IngestReceipt, PipelineError> {
        let pdf = pdf.ok_or(PipelineError::MissingFile)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(PipelineError::EmptyTitle);
        }

        // Validate the target before any external call.
        let subject = store.get_subject(subject_code).await.map_err(|e| match e {
            StoreError::NotFound(_) => PipelineError::UnknownSubject(subject_code.to_string()),
            other => PipelineError::Persistence(other),
        })?;
        if !subject.units.iter().any(|u| u.id == unit_id) {
            return Err(PipelineError::UnknownUnit {
                subject: subject.code,
                unit: unit_id.to_string(),
            });
        }

        // The page-image workspace exists only for strategy B and only for
        // the duration of this request.
        let workspace = match self.strategy {
            IngestStrategy::RenderOcr => Some(
                tempfile::tempdir().map_err(|e| PipelineError::Conversion(e.to_string()))?,
            ),
            IngestStrategy::InlinePdf => None,
        };

        let result = self
            .run_stages(
                store,
                &subject.code,
                unit_id,
                title,
                pdf,
                workspace.as_ref().map(|d| d.path()),
            )
            .await;

        // Cleanup happens on every exit path; failures are logged, never
        // escalated, and do not alter the already-computed outcome.
        if let Some(dir) = workspace {
            if let Err(e) = dir.close() {
                warn!(error = %e, "failed to remove temporary page images");
            }
        }

        result
    }

    async fn run_stages(
        &self,
        store: &dyn ContentStore,
        subject_code: &str,
        unit_id: &str,
        title: &str,
        pdf: Vec<u8>,
        workspace: Option<&Path>,
    ) -> Result<IngestReceipt, PipelineError> {
        let lecture_id = lecture_id_from_title(title);
        info!(%lecture_id, subject = %subject_code, %unit_id, "processing uploaded PDF");

        let (ocr_text, attachment) = match self.strategy {
            IngestStrategy::InlinePdf => (None, Some(PdfAttachment::new(pdf))),
            IngestStrategy::RenderOcr => {
                let dir = workspace.ok_or(PipelineError::Configuration)?;
                let text = self.extract_text(&pdf, dir).await?;
                (Some(text), None)
            }
        };

        let prompt = prompt::build_prompt(&lecture_id, title, unit_id, ocr_text.as_deref());

        let raw = self
            .generator
            .generate(&prompt, attachment.as_ref())
            .await
            .map_err(|e| match e {
                GeneratorError::Unconfigured => PipelineError::Configuration,
                other => PipelineError::AiService(other.to_string()),
            })?;

        let html_content = normalize::strip_html_fences(&raw);

        let lecture = store
            .append_lecture(NewLecture {
                lecture_id: lecture_id.clone(),
                subject_code: subject_code.to_string(),
                unit_id: unit_id.to_string(),
                title: title.to_string(),
                html_content,
            })
            .await?;

        info!(lecture_id = %lecture.lecture_id, "lecture generated and saved");
        Ok(IngestReceipt {
            lecture_id: lecture.lecture_id,
            title: lecture.title,
        })
    }

    /// Strategy B text acquisition: render every page into the workspace,
    /// OCR the pages in ascending page order, and join the text.
    async fn extract_text(&self, pdf: &[u8], dir: &Path) -> Result<String, PipelineError> {
        let renderer = self.renderer.as_ref().ok_or(PipelineError::Configuration)?;
        let ocr = self.ocr.as_ref().ok_or(PipelineError::Configuration)?;

        let mut pages = renderer
            .render_to_dir(pdf, dir)
            .await
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;

        // Filenames embed the page index; lexical order breaks past nine
        // pages ("page-10" < "page-2"), so sort on the parsed integer.
        pages.sort_by_key(|p| page_index(p).unwrap_or(usize::MAX));

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let image = tokio::fs::read(page)
                .await
                .map_err(|e| PipelineError::Ocr(e.to_string()))?;
            let text = ocr
                .recognize(&image)
                .await
                .map_err(|e| PipelineError::Ocr(e.to_string()))?;
            texts.push(text);
        }
        Ok(texts.join("\n"))
    }
}

/// Parses the page index out of a rendered page filename (`page-{n}.png`).
pub(crate) fn page_index(path: &PathBuf) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .rsplit('-')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_index_parses_the_numeric_suffix() {
        assert_eq!(page_index(&PathBuf::from("/tmp/x/page-0.png")), Some(0));
        assert_eq!(page_index(&PathBuf::from("/tmp/x/page-12.png")), Some(12));
        assert_eq!(page_index(&PathBuf::from("/tmp/x/cover.png")), None);
    }

    #[test]
    fn pages_sort_numerically_not_lexically() {
        let mut pages: Vec<PathBuf> = [2, 10, 1, 0]
            .iter()
            .map(|n| PathBuf::from(format!("page-{n}.png")))
            .collect();
        pages.sort_by_key(|p| page_index(p).unwrap_or(usize::MAX));
        let order: Vec<_> = pages.iter().filter_map(page_index).collect();
        assert_eq!(order, vec![0, 1, 2, 10]);
    }
}
