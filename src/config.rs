//! Configuration for room extraction.
//!
//! Every knob lives in [`ExtractionConfig`], built via
//! [`ExtractionConfigBuilder`]. The defaults reproduce the extraction
//! contract: all pages retrieved at once, records merged by page number,
//! trailing partial records kept.
//!
//! Decoder setup (where the pdfium library lives) is not part of this struct;
//! it is done once at startup with
//! [`crate::decoder::pdfium::PdfiumDecoder::initialize`].

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for one extraction.
///
/// # Example
/// ```rust
/// use room_extract::{ExtractionConfig, MergeOrder, PartialRecords};
///
/// let config = ExtractionConfig::builder()
///     .concurrency(4)
///     .merge_order(MergeOrder::PageNumber)
///     .partial_records(PartialRecords::Discard)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, Some(4));
/// ```
#[derive(Clone, Default)]
pub struct ExtractionConfig {
    /// Maximum number of page retrievals in flight. Default: `None` (every
    /// page is requested at once).
    pub concurrency: Option<usize>,

    /// Order in which page results are concatenated. Default:
    /// [`MergeOrder::PageNumber`].
    pub merge_order: MergeOrder,

    /// What to do with a trailing record that has fewer than five fields.
    /// Default: [`PartialRecords::Keep`].
    pub partial_records: PartialRecords,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("concurrency", &self.concurrency)
            .field("merge_order", &self.merge_order)
            .field("partial_records", &self.partial_records)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Number of page retrievals to keep in flight for a `total_pages` document.
    pub fn effective_concurrency(&self, total_pages: usize) -> usize {
        self.concurrency.unwrap_or(total_pages).max(1)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = Some(n);
        self
    }

    /// Request every page at once (the default).
    pub fn unbounded(mut self) -> Self {
        self.config.concurrency = None;
        self
    }

    pub fn merge_order(mut self, order: MergeOrder) -> Self {
        self.config.merge_order = order;
        self
    }

    pub fn partial_records(mut self, policy: PartialRecords) -> Self {
        self.config.partial_records = policy;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        if self.config.concurrency == Some(0) {
            return Err(ExtractError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How page results are concatenated into the document result.
///
/// Pages are retrieved concurrently and may finish in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeOrder {
    /// Ascending page number, regardless of completion timing. (default)
    #[default]
    PageNumber,
    /// The order pages happened to finish in.
    Completion,
}

/// Policy for a page's trailing record when its data-token count is not a
/// multiple of five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartialRecords {
    /// Keep it with its missing trailing fields. (default)
    #[default]
    Keep,
    /// Drop it.
    Discard,
}
