//! Error types for the doc-insights library.
//!
//! Errors are split by the stage that produces them:
//!
//! * [`InsightsError`]: **fatal**, the process cannot start serving
//!   (credential missing, inference client could not be built). The binary
//!   exits on these before any upload is accepted.
//!
//! * [`ExtractionError`], [`TemplateError`], [`InferenceError`]: **non-fatal**,
//!   one upload or one generation failed. The session layer turns them into a
//!   displayed notice and a `Halted` / `Failed` state so the user can re-upload
//!   or click again.
//!
//! * [`SessionError`]: an action was requested in a state that does not
//!   allow it (e.g. generate before upload).

use std::path::PathBuf;
use thiserror::Error;

/// Fatal start-up errors.
#[derive(Debug, Error)]
pub enum InsightsError {
    /// The bearer credential for the inference service is absent or empty.
    #[error("{var} not found. Please set it in your environment or .env file.")]
    MissingCredential { var: String },

    /// The inference client could not be constructed.
    #[error("Error initializing inference client: {detail}")]
    ClientInit { detail: String },

    /// A named edgequake-llm provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a document produced no text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Extension is neither `pdf` nor `txt`.
    #[error("Unsupported file type '{extension}' for '{file_name}'. Please upload a PDF or TXT file.")]
    UnsupportedType { file_name: String, extension: String },

    /// Declared as PDF but the bytes do not start with `%PDF`.
    #[error("File is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The pdfium library could not be loaded.
    #[error("PDF engine unavailable: {detail}\nSet PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.")]
    PdfEngineUnavailable { detail: String },

    /// pdfium failed to parse the document or a page.
    #[error("Error extracting text from PDF: {detail}")]
    PdfParse { detail: String },

    /// Text file is not valid UTF-8.
    #[error("Error reading text file: {source}")]
    Utf8 {
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Internal extraction error: {0}")]
    Internal(String),
}

/// The prompt template could not be loaded.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("{} file not found. Please create it with the required prompt structure.", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read template '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The single generation call failed.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// Network / TLS / connection fault.
    #[error("Error during API call to the inference service: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Inference service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    /// The body could not be decoded into generated text.
    #[error("Invalid response from inference service: {0}")]
    InvalidResponse(String),

    /// An edgequake-llm provider returned an error.
    #[error("LLM provider error: {0}")]
    Provider(String),
}

/// An action that the current session state does not permit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot {action} while session is {from}")]
pub struct SessionError {
    pub from: &'static str,
    pub action: &'static str,
}
