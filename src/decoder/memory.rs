//! In-memory decoder: a document described as pages of tokens.
//!
//! Used by the test-suite and by callers that already hold a page's text.
//! Each page can be given a latency (to make pages resolve out of order) or a
//! failure. The decoder counts `open_document` calls so callers can assert
//! that rejected uploads never reach it.

use crate::decoder::{check_page, PdfDecoder, PdfDocument, PdfPage, TextContent};
use crate::error::DecoderError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Magic prefix every byte buffer must start with.
const PDF_MAGIC: &[u8] = b"%PDF";

/// One page of a [`MemoryDecoder`] document.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    content: TextContent,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl MemoryPage {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: TextContent::from_strings(tokens),
            ..Self::default()
        }
    }

    /// Resolve `text_content` only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `text_content` fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

/// A decoder that serves a fixed set of pages from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecoder {
    pages: Arc<Vec<MemoryPage>>,
    open_error: Option<DecoderError>,
    opens: Arc<AtomicUsize>,
}

impl MemoryDecoder {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages: Arc::new(pages),
            ..Self::default()
        }
    }

    /// Make `open_document` fail with `error` regardless of input.
    pub fn failing_open(mut self, error: DecoderError) -> Self {
        self.open_error = Some(error);
        self
    }

    /// Number of `open_document` calls so far (shared between clones).
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfDecoder for MemoryDecoder {
    async fn open_document(
        &self,
        bytes: Vec<u8>,
        _password: Option<&str>,
    ) -> Result<Arc<dyn PdfDocument>, DecoderError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        if let Some(ref e) = self.open_error {
            return Err(e.clone());
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DecoderError::Malformed("missing %PDF header".into()));
        }

        Ok(Arc::new(MemoryDocument {
            pages: Arc::clone(&self.pages),
        }))
    }
}

struct MemoryDocument {
    pages: Arc<Vec<MemoryPage>>,
}

#[async_trait]
impl PdfDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page(&self, page_num: usize) -> Result<Box<dyn PdfPage>, DecoderError> {
        check_page(page_num, self.pages.len())?;
        Ok(Box::new(MemoryPageHandle {
            page_num,
            page: self.pages[page_num - 1].clone(),
        }))
    }
}

struct MemoryPageHandle {
    page_num: usize,
    page: MemoryPage,
}

#[async_trait]
impl PdfPage for MemoryPageHandle {
    fn page_num(&self) -> usize {
        self.page_num
    }

    async fn text_content(&self) -> Result<TextContent, DecoderError> {
        if let Some(delay) = self.page.delay {
            tokio::time::sleep(delay).await;
        }
        match self.page.failure {
            Some(ref message) => Err(DecoderError::Backend(message.clone())),
            None => Ok(self.page.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_pages_in_order() {
        let decoder = MemoryDecoder::new(vec![
            MemoryPage::new(["a", "b"]),
            MemoryPage::new(["c"]),
        ]);
        let doc = decoder.open_document(b"%PDF-1.7".to_vec(), None).await.unwrap();
        assert_eq!(doc.page_count(), 2);

        let page = doc.page(2).await.unwrap();
        assert_eq!(page.page_num(), 2);
        assert_eq!(page.text_content().await.unwrap(), TextContent::from_strings(["c"]));
        assert_eq!(decoder.open_count(), 1);
    }

    #[tokio::test]
    async fn rejects_non_pdf_bytes() {
        let decoder = MemoryDecoder::new(vec![]);
        let err = decoder.open_document(b"PK\x03\x04".to_vec(), None).await.err();
        assert!(matches!(err, Some(DecoderError::Malformed(_))));
    }

    #[tokio::test]
    async fn page_out_of_range() {
        let decoder = MemoryDecoder::new(vec![MemoryPage::new(["a"])]);
        let doc = decoder.open_document(b"%PDF".to_vec(), None).await.unwrap();
        let err = doc.page(2).await.err();
        assert_eq!(err, Some(DecoderError::PageOutOfRange { page: 2, total: 1 }));
    }

    #[tokio::test]
    async fn failing_page_reports_backend_error() {
        let decoder = MemoryDecoder::new(vec![MemoryPage::new(["a"]).failing("boom")]);
        let doc = decoder.open_document(b"%PDF".to_vec(), None).await.unwrap();
        let page = doc.page(1).await.unwrap();
        assert_eq!(
            page.text_content().await,
            Err(DecoderError::Backend("boom".into()))
        );
    }

    #[tokio::test]
    async fn failing_open_counts_the_call() {
        let decoder = MemoryDecoder::new(vec![]).failing_open(DecoderError::PasswordRequired);
        let err = decoder.open_document(b"%PDF".to_vec(), None).await.err();
        assert_eq!(err, Some(DecoderError::PasswordRequired));
        assert_eq!(decoder.open_count(), 1);
    }
}
