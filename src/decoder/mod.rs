//! The PDF decoder seam.
//!
//! Extraction only needs three things from a PDF library: open a byte buffer,
//! report the page count, and return a page's text items in content order.
//! Those are modelled as async traits so that pages can be retrieved
//! concurrently and resolve independently of one another.
//!
//! Two implementations ship with the crate:
//!
//! * [`pdfium::PdfiumDecoder`] — the production backend, built on
//!   `pdfium-render`.
//! * [`memory::MemoryDecoder`] — pages of tokens held in memory, with
//!   optional per-page latency and failures.

pub mod memory;
pub mod pdfium;

use crate::error::DecoderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Opens PDF byte buffers.
#[async_trait]
pub trait PdfDecoder: Send + Sync {
    /// Parse `bytes` as a PDF document.
    async fn open_document(
        &self,
        bytes: Vec<u8>,
        password: Option<&str>,
    ) -> Result<Arc<dyn PdfDocument>, DecoderError>;
}

/// An opened document.
#[async_trait]
pub trait PdfDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Fetch page `page_num` (1-indexed).
    async fn page(&self, page_num: usize) -> Result<Box<dyn PdfPage>, DecoderError>;
}

/// One page of an opened document.
#[async_trait]
pub trait PdfPage: Send + Sync {
    /// 1-indexed page number.
    fn page_num(&self) -> usize;

    /// Text items of this page in content-stream order.
    async fn text_content(&self) -> Result<TextContent, DecoderError>;
}

/// A page's ordered text items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContent {
    pub items: Vec<TextItem>,
}

/// A single string unit placed on the page by the content stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextContent {
    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: strings.into_iter().map(TextItem::new).collect(),
        }
    }

    /// Consume the content, yielding each item's string.
    pub fn into_strings(self) -> impl Iterator<Item = String> {
        self.items.into_iter().map(|item| item.text)
    }
}

/// Check the page number against the document's page count.
pub(crate) fn check_page(page_num: usize, total: usize) -> Result<(), DecoderError> {
    if page_num == 0 || page_num > total {
        return Err(DecoderError::PageOutOfRange {
            page: page_num,
            total,
        });
    }
    Ok(())
}
