//! services/api/src/adapters/pdf_renderer.rs
//!
//! Rasterises PDF pages to PNG files via pdfium.
//!
//! pdfium wraps a C++ library with thread-local state that must not be
//! driven from async contexts, so the actual rendering runs inside
//! `tokio::task::spawn_blocking`. Each page lands in the pipeline's
//! per-request directory as `page-{index}.png`.

use async_trait::async_trait;
use lectern_core::ports::{PageRenderer, RenderError};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longest-edge cap for rendered pages, in pixels. Keeps memory bounded for
/// oversized page formats while staying comfortably above OCR needs.
const MAX_RENDERED_PIXELS: i32 = 2048;

/// A `PageRenderer` backed by pdfium.
#[derive(Default)]
pub struct PdfiumRenderer;

#[async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn render_to_dir(&self, pdf: &[u8], dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        let bytes = pdf.to_vec();
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || render_blocking(&bytes, &dir))
            .await
            .map_err(|e| RenderError::Io(format!("render task panicked: {e}")))?
    }
}

fn render_blocking(pdf: &[u8], dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| RenderError::BadDocument(format!("{e:?}")))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(MAX_RENDERED_PIXELS)
        .set_maximum_height(MAX_RENDERED_PIXELS);

    let pages = document.pages();
    let mut out = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::Page {
                page: index,
                detail: format!("{e:?}"),
            })?;
        let image = bitmap.as_image();

        let path = dir.join(format!("page-{index}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| RenderError::Io(e.to_string()))?;
        debug!(page = index, width = image.width(), height = image.height(), "rendered page");
        out.push(path);
    }
    Ok(out)
}
