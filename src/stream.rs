//! Streaming extraction API: emit pages as they complete.
//!
//! Unlike the eager [`crate::extract::extract`], which returns only after
//! every page resolved, [`extract_stream`] yields each page's
//! [`PageRooms`] through a `Stream` as soon as its text has been retrieved
//! and grouped. Pages arrive in completion order; sort by `page_num` if
//! order matters.
//!
//! The stream does not stop on its own after a page error. Callers that want
//! the eager all-or-nothing behaviour should stop polling at the first `Err`
//! (dropping the stream cancels the remaining retrievals).
//!
//! `on_extraction_complete` fires when the stream is drained and every page
//! succeeded. A stream that is dropped early or that yielded an `Err` never
//! reports completion.

use crate::config::ExtractionConfig;
use crate::decoder::{PdfDecoder, PdfDocument};
use crate::error::ExtractError;
use crate::extract::process_page;
use crate::output::PageRooms;
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of page results.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<PageRooms, ExtractError>> + Send>>;

/// Open `bytes` and stream each page's records as it completes.
///
/// # Returns
/// - `Ok(PageStream)` — one item per page
/// - `Err(ExtractError::DocumentOpen)` — the document could not be opened
///
/// # Example
/// ```rust,no_run
/// use room_extract::decoder::pdfium::{PdfiumDecoder, PdfiumLibrary};
/// use room_extract::{extract_stream, ExtractionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let decoder = PdfiumDecoder::initialize(PdfiumLibrary::Auto)?;
/// let bytes: Vec<u8> = std::fs::read("rooms.pdf")?;
/// let mut pages = extract_stream(&bytes, &decoder, &ExtractionConfig::default()).await?;
/// while let Some(page) = pages.next().await {
///     match page {
///         Ok(p) => println!("Page {}: {} rooms", p.page_num, p.records.len()),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_stream(
    bytes: &[u8],
    decoder: &dyn PdfDecoder,
    config: &ExtractionConfig,
) -> Result<PageStream, ExtractError> {
    info!("Starting streaming extraction: {} bytes", bytes.len());

    let document: Arc<dyn PdfDocument> = decoder
        .open_document(bytes.to_vec(), config.password.as_deref())
        .await
        .map_err(|source| ExtractError::DocumentOpen { source })?;
    let total_pages = document.page_count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total_pages);
    }

    let limit = config.effective_concurrency(total_pages);
    let config_clone = config.clone();

    let s = stream::iter((1..=total_pages).map(move |page_num| {
        let document = Arc::clone(&document);
        let cfg = config_clone.clone();
        async move { process_page(document.as_ref(), page_num, total_pages, &cfg).await }
    }))
    .buffer_unordered(limit);

    // ── Completion hook ──────────────────────────────────────────────────
    let records = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicBool::new(false));

    let s = s.inspect({
        let records = Arc::clone(&records);
        let failed = Arc::clone(&failed);
        move |item| match item {
            Ok(page) => {
                records.fetch_add(page.records.len(), Ordering::SeqCst);
            }
            Err(_) => failed.store(true, Ordering::SeqCst),
        }
    });

    let callback = config.progress_callback.clone();
    let finish = stream::once(async move {
        if failed.load(Ordering::SeqCst) {
            return;
        }
        let total_records = records.load(Ordering::SeqCst);
        info!(
            "Streaming extraction complete: {} records from {} pages",
            total_records, total_pages
        );
        if let Some(cb) = callback {
            cb.on_extraction_complete(total_pages, total_records);
        }
    })
    .filter_map(|()| future::ready(None::<Result<PageRooms, ExtractError>>));

    Ok(Box::pin(s.chain(finish)))
}
