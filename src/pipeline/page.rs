//! Per-page processing: decoder text items → filtered tokens → records.

use crate::config::PartialRecords;
use crate::decoder::TextContent;
use crate::output::PageRooms;
use crate::pipeline::{filter, group};
use tracing::debug;

/// Turn one page's text content into its [`PageRooms`].
///
/// Pure and independent of every other page, so it can run as soon as that
/// page's retrieval resolves.
pub fn build_page(page_num: usize, content: TextContent, policy: PartialRecords) -> PageRooms {
    let token_count = content.items.len();
    let data: Vec<String> = filter::data_tokens(content.into_strings()).collect();
    let data_token_count = data.len();
    let records = group::apply_partial_policy(group::group_records(data), policy);

    debug!(
        "Page {}: {} tokens, {} data tokens → {} records",
        page_num,
        token_count,
        data_token_count,
        records.len()
    );

    PageRooms {
        page_num,
        token_count,
        data_token_count,
        records,
    }
}
