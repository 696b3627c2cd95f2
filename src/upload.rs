//! Upload handling: the user-selected file, its declared type, and the
//! parse flow that drives a [`RoomPresenter`].
//!
//! The declared MIME type is checked before anything else happens. A file
//! that does not declare `application/pdf` is rejected with an alert and the
//! decoder is never called.

use crate::config::ExtractionConfig;
use crate::decoder::PdfDecoder;
use crate::error::ExtractError;
use crate::extract::extract_upload;
use crate::output::ExtractionOutput;
use crate::present::RoomPresenter;
use crate::stats::RoomStats;
use std::path::Path;
use tracing::{debug, info, warn};

/// The only MIME type accepted for extraction.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Message shown to the user when a non-PDF file is selected.
pub const NOT_A_PDF_ALERT: &str = "Please upload a PDF file.";

const OCTET_STREAM: &str = "application/octet-stream";

/// A file selected by the user: name, declared type and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk and declare its type from the file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_type_for(path, &bytes);
        debug!("Read {} ({} bytes, {})", name, bytes.len(), mime_type);

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME_TYPE
    }

    /// Fail with [`ExtractError::InvalidFileType`] unless the upload declares
    /// `application/pdf`.
    pub fn ensure_pdf(&self) -> Result<(), ExtractError> {
        if self.is_pdf() {
            Ok(())
        } else {
            Err(ExtractError::InvalidFileType {
                name: self.name.clone(),
                mime_type: self.mime_type.clone(),
            })
        }
    }
}

/// Declared MIME type for a file, the way a browser file picker reports it.
///
/// Known extensions win. Files without an extension are sniffed for the
/// `%PDF` header; anything else is `application/octet-stream`.
pub fn mime_type_for(path: &Path, bytes: &[u8]) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    let mime = match ext.as_deref() {
        Some("pdf") => PDF_MIME_TYPE,
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("htm") | Some("html") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some(_) => OCTET_STREAM,
        None if bytes.starts_with(b"%PDF") => PDF_MIME_TYPE,
        None => OCTET_STREAM,
    };
    mime.to_string()
}

/// Run one parse attempt for `upload` against `presenter`.
///
/// A non-PDF upload raises the alert and returns
/// [`ExtractError::InvalidFileType`] with the presenter untouched.
/// Otherwise the table and statistics are cleared, the document is
/// extracted, and on success the rooms and their statistics are shown. On
/// failure the presenter stays cleared.
pub async fn parse_upload(
    upload: &PdfUpload,
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
    presenter: &mut dyn RoomPresenter,
) -> Result<ExtractionOutput, ExtractError> {
    if let Err(e) = upload.ensure_pdf() {
        warn!("Rejected '{}': declared type {}", upload.name, upload.mime_type);
        presenter.alert(NOT_A_PDF_ALERT);
        return Err(e);
    }

    presenter.clear_table();
    presenter.clear_stats();

    let output = extract_upload(upload, decoder, config).await?;
    info!("Parsed '{}': {} rooms", upload.name, output.rooms.len());

    presenter.show_rooms(&output.rooms);
    presenter.show_stats(&RoomStats::from_records(&output.rooms));

    Ok(output)
}
