//! Upload resolution: classify an uploaded file by its declared name.
//!
//! The type tag comes from the file extension only, the same way the upload
//! widget filters files. Content checks (PDF magic bytes, UTF-8 validity)
//! belong to [`super::extract`] so that every content fault surfaces as an
//! extraction failure rather than an unsupported-type halt.

use crate::error::ExtractionError;
use std::fmt;
use tracing::debug;

/// Accepted upload extensions, lower-case.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Inferred type tag of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Txt,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Pdf => f.write_str("pdf"),
            DocumentType::Txt => f.write_str("txt"),
        }
    }
}

/// A single uploaded file, alive for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub doc_type: DocumentType,
}

/// Lower-cased text after the last `.`; the whole name when there is none.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Map a file name to its [`DocumentType`].
pub fn detect_document_type(file_name: &str) -> Result<DocumentType, ExtractionError> {
    match file_extension(file_name).as_str() {
        "pdf" => Ok(DocumentType::Pdf),
        "txt" => Ok(DocumentType::Txt),
        other => Err(ExtractionError::UnsupportedType {
            file_name: file_name.to_string(),
            extension: other.to_string(),
        }),
    }
}

/// Build an [`UploadedDocument`], rejecting unsupported extensions.
pub fn resolve_upload(
    file_name: impl Into<String>,
    bytes: Vec<u8>,
) -> Result<UploadedDocument, ExtractionError> {
    let file_name = file_name.into();
    let doc_type = detect_document_type(&file_name)?;
    debug!("Resolved upload '{}' as {} ({} bytes)", file_name, doc_type, bytes.len());
    Ok(UploadedDocument {
        file_name,
        bytes,
        doc_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.PDF"), "pdf");
        assert_eq!(file_extension("notes.v2.txt"), "txt");
        assert_eq!(file_extension("README"), "readme");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_detect_document_type() {
        assert_eq!(detect_document_type("a.pdf").unwrap(), DocumentType::Pdf);
        assert_eq!(detect_document_type("a.Txt").unwrap(), DocumentType::Txt);
        assert!(matches!(
            detect_document_type("a.docx"),
            Err(ExtractionError::UnsupportedType { ref extension, .. }) if extension == "docx"
        ));
        assert!(detect_document_type("noextension").is_err());
    }

    #[test]
    fn resolve_keeps_bytes() {
        let doc = resolve_upload("hello.txt", b"Hello world".to_vec()).unwrap();
        assert_eq!(doc.doc_type, DocumentType::Txt);
        assert_eq!(doc.bytes, b"Hello world");
        assert_eq!(doc.file_name, "hello.txt");
    }
}
