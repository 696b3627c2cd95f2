//! # room-extract
//!
//! Extract campus housing room records (college, building, room, type,
//! square footage) from tabular PDF room lists.
//!
//! ## How it works
//!
//! A room list PDF lays its table out as a flat run of text items: a header
//! row, then five cells per room. Every page is read independently, the
//! header and boilerplate words are filtered out, and the remaining tokens
//! are grouped five at a time into [`RoomRecord`]s.
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Upload   declared type must be application/pdf
//!  ├─ 2. Open     decoder parses the buffer, reports N pages
//!  ├─ 3. Pages    all N text retrievals issued at once (buffer_unordered)
//!  ├─ 4. Filter   drop empty strings, "college", blocklisted words
//!  ├─ 5. Group    position mod 5 → college/building/room/type/sqft
//!  └─ 6. Merge    page results concatenated in page order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use room_extract::decoder::pdfium::{PdfiumDecoder, PdfiumLibrary};
//! use room_extract::{extract_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Binds libpdfium from PDFIUM_LIB_PATH, the current directory, or the system
//!     let decoder = PdfiumDecoder::initialize(PdfiumLibrary::Auto)?;
//!     let output = extract_file("rooms.pdf", &decoder, &ExtractionConfig::default()).await?;
//!     for room in &output.rooms {
//!         println!("{:?}", room);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `room-extract` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! room-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod stats;
pub mod stream;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, MergeOrder, PartialRecords};
pub use decoder::memory::{MemoryDecoder, MemoryPage};
pub use decoder::pdfium::{PdfiumDecoder, PdfiumLibrary};
pub use decoder::{PdfDecoder, PdfDocument, PdfPage, TextContent, TextItem};
pub use error::{DecoderError, ExtractError};
pub use extract::{extract, extract_file, extract_rooms, extract_sync, extract_upload};
pub use output::{ExtractionOutput, ExtractionStats, PageRooms, RoomField, RoomRecord};
pub use pipeline::filter::is_data_token;
pub use present::RoomPresenter;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stats::{RoomStats, SquareFootage};
pub use stream::{extract_stream, PageStream};
pub use upload::{parse_upload, PdfUpload, PDF_MIME_TYPE};
