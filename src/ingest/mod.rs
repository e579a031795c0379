//! Turning files and web pages into [`DocumentUnit`]s.
//!
//! PDFs load as one unit per page. DOCX and plain-text files load as a single
//! unit. Web pages load as one unit per URL.

pub mod docx;
pub mod download;
pub mod web;

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::DocumentUnit;

pub use download::download_file;
pub use web::load_websites;

/// File types the loader can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Load a local file by extension.
///
/// Returns `Ok(None)` for an unsupported extension. Read and parse failures
/// are errors.
pub async fn load_document(path: &Path) -> Result<Option<Vec<DocumentUnit>>> {
    let Some(kind) = DocumentKind::from_path(path) else {
        tracing::info!(file = %path.display(), "Document format is not supported!");
        return Ok(None);
    };

    tracing::info!(file = %path.display(), "Loading document");
    let source = path.display().to_string();

    let units = match kind {
        DocumentKind::Pdf => {
            let owned = path.to_path_buf();
            let pages =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
                    .await
                    .context("PDF extraction task panicked")?
                    .with_context(|| format!("Failed to extract text from {source}"))?;
            pages
                .into_iter()
                .enumerate()
                .map(|(page, text)| DocumentUnit::new(text, source.as_str()).with_page(page))
                .collect()
        }
        DocumentKind::Docx => {
            let owned = path.to_path_buf();
            let text = tokio::task::spawn_blocking(move || docx::extract_text(&owned))
                .await
                .context("DOCX extraction task panicked")??;
            vec![DocumentUnit::new(text, source)]
        }
        DocumentKind::Text => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {source}"))?;
            vec![DocumentUnit::new(String::from_utf8_lossy(&bytes), source)]
        }
    };

    tracing::info!(pages = units.len(), "Loaded document");
    Ok(Some(units))
}
