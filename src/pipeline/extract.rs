//! Text extraction: uploaded bytes → plain text.
//!
//! `pdfium-render` wraps the pdfium C++ library, which is CPU-bound and not
//! async-aware, so the PDF branch runs on tokio's blocking pool.
//!
//! PDF text is the in-order concatenation of per-page text; pages that yield
//! no text are skipped entirely rather than contributing a blank line.

use crate::error::ExtractionError;
use crate::pipeline::input::{DocumentType, UploadedDocument};
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Separator placed between the texts of consecutive non-empty pages.
pub const PAGE_SEPARATOR: &str = "\n";

/// Environment variable pointing at an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Extract text from an uploaded document.
///
/// The returned string may be empty (e.g. a scanned PDF with no text layer);
/// callers treat that as "nothing to summarize".
pub async fn extract(document: &UploadedDocument) -> Result<String, ExtractionError> {
    let text = match document.doc_type {
        DocumentType::Pdf => {
            check_pdf_magic(&document.bytes)?;
            let bytes = document.bytes.clone();
            tokio::task::spawn_blocking(move || extract_pdf_blocking(&bytes))
                .await
                .map_err(|e| ExtractionError::Internal(format!("Extraction task panicked: {}", e)))??
        }
        DocumentType::Txt => decode_text(&document.bytes)?,
    };

    info!(
        "Extracted {} chars from '{}'",
        text.chars().count(),
        document.file_name
    );
    Ok(text)
}

/// Decode a text upload as UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    String::from_utf8(bytes.to_vec()).map_err(|source| ExtractionError::Utf8 { source })
}

/// Join page texts in order, skipping pages with no text.
pub fn join_page_texts<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for page in pages {
        let page = page.as_ref();
        if page.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(PAGE_SEPARATOR);
        }
        out.push_str(page);
    }
    out
}

/// Reject bytes that do not start with the `%PDF` header.
fn check_pdf_magic(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(ExtractionError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Bind pdfium from `PDFIUM_LIB_PATH` when set, otherwise the system library.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractionError::PdfEngineUnavailable {
        detail: format!("{:?}", e),
    })?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of PDF text extraction.
fn extract_pdf_blocking(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ExtractionError::PdfParse {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let mut texts = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ExtractionError::PdfParse {
                detail: format!("page {}: {:?}", idx + 1, e),
            })?
            .all();
        debug!("Page {}/{}: {} chars", idx + 1, total_pages, text.len());
        texts.push(text);
    }

    Ok(join_page_texts(texts))
}
