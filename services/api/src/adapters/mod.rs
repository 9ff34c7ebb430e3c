//! services/api/src/adapters/mod.rs
//!
//! Concrete implementations of the core service ports: the two content
//! store backends plus the Gemini, OCR, and page-rendering adapters.

pub mod file_store;
pub mod fragments;
pub mod gemini;
pub mod ocr_http;
pub mod pdf_renderer;
pub mod pg_store;
