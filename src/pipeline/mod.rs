//! Pipeline stages for document insight generation.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ compose ──▶ llm ──▶ postprocess
//! (upload)   (pdfium)   (template)  (HF)    (cleanup)
//! ```
//!
//! 1. [`input`]: classify the upload by extension
//! 2. [`extract`]: PDF text via pdfium in `spawn_blocking`, or UTF-8 decode
//! 3. [`compose`]: truncate to the character budget and fill the template
//! 4. [`llm`]: the single generation call; the only stage with network I/O
//! 5. [`postprocess`]: deterministic cleanup of the returned Markdown

pub mod compose;
pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
