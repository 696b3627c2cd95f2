//! Room extraction entry points.
//!
//! [`extract`] opens the document, requests every page's text at once,
//! turns each page into records as soon as it resolves, and returns only
//! after all pages succeeded. The first page failure aborts the whole run;
//! no partial result is returned. Use [`crate::stream::extract_stream`]
//! instead to receive pages as they complete.

use crate::config::{ExtractionConfig, MergeOrder};
use crate::decoder::{PdfDecoder, PdfDocument};
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, ExtractionStats, PageRooms, RoomRecord};
use crate::pipeline::page;
use crate::upload::PdfUpload;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract room records from PDF bytes.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `bytes`   — Raw PDF bytes
/// * `decoder` — Initialised PDF decoder
/// * `config`  — Extraction configuration
///
/// # Errors
/// - [`ExtractError::DocumentOpen`] if the decoder cannot parse `bytes`
/// - [`ExtractError::PageRetrieval`] for the first page whose text could not
///   be retrieved
///
/// # Example
/// ```rust,no_run
/// use room_extract::decoder::pdfium::{PdfiumDecoder, PdfiumLibrary};
/// use room_extract::{extract, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let decoder = PdfiumDecoder::initialize(PdfiumLibrary::Auto)?;
/// let bytes = std::fs::read("rooms.pdf")?;
/// let output = extract(&bytes, &decoder, &ExtractionConfig::default()).await?;
/// println!("{} rooms", output.rooms.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract(
    bytes: &[u8],
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let start = Instant::now();
    info!("Starting extraction: {} bytes", bytes.len());

    // ── Step 1: Open document ────────────────────────────────────────────
    let document = decoder
        .open_document(bytes.to_vec(), config.password.as_deref())
        .await
        .map_err(|source| ExtractError::DocumentOpen { source })?;
    let total_pages = document.page_count();
    info!("PDF has {} pages", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total_pages);
    }

    // ── Step 2: Retrieve and process every page concurrently ─────────────
    let limit = config.effective_concurrency(total_pages);
    debug!("Retrieving {} pages, {} at a time", total_pages, limit);

    let mut pages: Vec<PageRooms> = stream::iter(
        (1..=total_pages).map(|page_num| process_page(document.as_ref(), page_num, total_pages, config)),
    )
    .buffer_unordered(limit)
    .try_collect()
    .await?;

    // ── Step 3: Merge ────────────────────────────────────────────────────
    if config.merge_order == MergeOrder::PageNumber {
        pages.sort_by_key(|p| p.page_num);
    }

    let output = assemble(pages, total_pages, start);

    info!(
        "Extraction complete: {} records from {} pages, {}ms",
        output.stats.total_records, total_pages, output.stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(total_pages, output.stats.total_records);
    }

    Ok(output)
}

/// Extract only the room list.
pub async fn extract_rooms(
    bytes: &[u8],
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<Vec<RoomRecord>, ExtractError> {
    Ok(extract(bytes, decoder, config).await?.rooms)
}

/// Check the upload's declared type, then extract.
///
/// A non-PDF upload fails with [`ExtractError::InvalidFileType`] before the
/// decoder is called.
pub async fn extract_upload(
    upload: &PdfUpload,
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    upload.ensure_pdf()?;
    extract(&upload.bytes, decoder, config).await
}

/// Read a file from disk and extract it.
pub async fn extract_file(
    path: impl AsRef<Path>,
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let upload = PdfUpload::from_path(path).await?;
    extract_upload(&upload, decoder, config).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    bytes: &[u8],
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(bytes, decoder, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Retrieve one page's text and build its records.
pub(crate) async fn process_page(
    document: &dyn PdfDocument,
    page_num: usize,
    total_pages: usize,
    config: &ExtractionConfig,
) -> Result<PageRooms, ExtractError> {
    let result = retrieve_page(document, page_num, config).await;

    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(page) => cb.on_page_complete(page_num, total_pages, page.records.len()),
            Err(e) => cb.on_page_error(page_num, total_pages, &e.to_string()),
        }
    }
    if let Err(ref e) = result {
        warn!("Page {}: {}", page_num, e);
    }

    result
}

async fn retrieve_page(
    document: &dyn PdfDocument,
    page_num: usize,
    config: &ExtractionConfig,
) -> Result<PageRooms, ExtractError> {
    let page_err = |source| ExtractError::PageRetrieval {
        page: page_num,
        source,
    };

    let handle = document.page(page_num).await.map_err(page_err)?;
    let content = handle.text_content().await.map_err(page_err)?;

    Ok(page::build_page(page_num, content, config.partial_records))
}

/// Concatenate page results (already in merge order) into the document result.
fn assemble(pages: Vec<PageRooms>, total_pages: usize, start: Instant) -> ExtractionOutput {
    let rooms: Vec<RoomRecord> = pages
        .iter()
        .flat_map(|p| p.records.iter().cloned())
        .collect();

    let stats = ExtractionStats {
        total_pages,
        total_tokens: pages.iter().map(|p| p.token_count).sum(),
        data_tokens: pages.iter().map(|p| p.data_token_count).sum(),
        total_records: rooms.len(),
        partial_records: rooms.iter().filter(|r| !r.is_complete()).count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    ExtractionOutput {
        rooms,
        pages,
        stats,
    }
}
