//! Error types for the room-extract library.
//!
//! Two error types reflect the two layers of the system:
//!
//! * [`ExtractError`] — **Fatal** for the current parse attempt: the upload is
//!   not a PDF, the document cannot be opened, or a page's text could not be
//!   retrieved. Returned as `Err(ExtractError)` from every `extract*` entry
//!   point. There are no retries; the user selects a file again.
//!
//! * [`DecoderError`] — raised by a [`crate::decoder::PdfDecoder`]
//!   implementation. It never reaches callers on its own: the extractor wraps
//!   it in [`ExtractError::DocumentOpen`] or [`ExtractError::PageRetrieval`]
//!   so the caller always knows *which* step failed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the room-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The selected file does not declare `application/pdf`.
    #[error("'{name}' is not a PDF (declared type: {mime_type})\nPlease upload a PDF file.")]
    InvalidFileType { name: String, mime_type: String },

    /// The file-read collaborator could not read the selected file.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Decoder errors ────────────────────────────────────────────────────
    /// The decoder could not parse the byte buffer as a PDF.
    #[error("Could not open PDF: {source}")]
    DocumentOpen {
        #[source]
        source: DecoderError,
    },

    /// Text retrieval for a single page failed; the whole extraction aborts.
    #[error("Text retrieval failed for page {page}: {source}")]
    PageRetrieval {
        page: usize,
        #[source]
        source: DecoderError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library during decoder initialisation.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary (current directory).\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// 1-based page number of a [`ExtractError::PageRetrieval`] failure.
    pub fn page(&self) -> Option<usize> {
        match self {
            ExtractError::PageRetrieval { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// An error raised by a PDF decoder backend.
///
/// Carries strings rather than backend error values so it is `Clone` and can
/// cross the pdfium worker channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// Header/trailer/xref is corrupt, or the bytes are not a PDF at all.
    #[error("malformed PDF: {0}")]
    Malformed(String),

    /// The PDF is encrypted and no password was supplied.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// A password was supplied but it is wrong.
    #[error("wrong password for encrypted PDF")]
    WrongPassword,

    /// A page number outside `1..=total` was requested.
    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),

    /// The thread serving the document went away before answering.
    #[error("decoder worker is no longer running")]
    WorkerUnavailable,
}
