//! Pure per-page stages of room extraction.
//!
//! Each submodule implements exactly one transformation step and has no I/O,
//! so every stage is testable without a PDF or a decoder.
//!
//! ## Data Flow
//!
//! ```text
//! TextContent ──▶ filter ──▶ group ──▶ PageRooms
//!  (decoder)     (blocklist)  (mod 5)
//! ```
//!
//! 1. [`filter`] — drop headers and boilerplate via the case-insensitive
//!    substring blocklist
//! 2. [`group`]  — fold surviving tokens into five-field records by position
//! 3. [`page`]   — run both for one page and count what was kept

pub mod filter;
pub mod group;
pub mod page;
