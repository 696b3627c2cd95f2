//! Integration tests for the extraction flow, driven by the in-memory decoder.
//!
//! Run with:
//!   cargo test --test extract

use futures::TryStreamExt;
use room_extract::{
    extract, extract_file, extract_rooms, extract_stream, extract_upload, parse_upload,
    DecoderError, ExtractError, ExtractionConfig, ExtractionProgressCallback, MemoryDecoder,
    MemoryPage, MergeOrder, PageRooms, PartialRecords, PdfUpload, RoomPresenter, RoomRecord,
    RoomStats, PDF_MIME_TYPE,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const PDF: &[u8] = b"%PDF-1.7\n";

// ── Test helpers ─────────────────────────────────────────────────────────────

const HEADER: [&str; 5] = ["College", "Building", "Room", "Type", "Sq. Ft."];

/// A page laid out like a housing listing: header row, then one row per room.
fn listing(rows: &[[&str; 5]]) -> MemoryPage {
    let mut tokens: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
    for row in rows {
        tokens.extend(row.iter().map(|s| s.to_string()));
    }
    MemoryPage::new(tokens)
}

fn colleges(rooms: &[RoomRecord]) -> Vec<&str> {
    rooms.iter().filter_map(|r| r.college.as_deref()).collect()
}

/// Three pages that finish in reverse order (3, 2, 1).
fn reversed_timing() -> MemoryDecoder {
    MemoryDecoder::new(vec![
        listing(&[["Cowell", "A", "101", "Single", "120"]]).with_delay(Duration::from_millis(90)),
        listing(&[["Merrill", "B", "202", "Double", "240"]]).with_delay(Duration::from_millis(45)),
        listing(&[["Porter", "C", "303", "Triple", "360"]]),
    ])
}

#[derive(Default)]
struct RecordingPresenter {
    calls: Vec<String>,
    rooms: Vec<RoomRecord>,
    stats: Option<RoomStats>,
}

impl RoomPresenter for RecordingPresenter {
    fn clear_table(&mut self) {
        self.calls.push("clear_table".into());
    }
    fn clear_stats(&mut self) {
        self.calls.push("clear_stats".into());
    }
    fn show_rooms(&mut self, rooms: &[RoomRecord]) {
        self.calls.push("show_rooms".into());
        self.rooms = rooms.to_vec();
    }
    fn show_stats(&mut self, stats: &RoomStats) {
        self.calls.push("show_stats".into());
        self.stats = Some(stats.clone());
    }
    fn alert(&mut self, message: &str) {
        self.calls.push(format!("alert: {message}"));
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ExtractionProgressCallback for EventLog {
    fn on_extraction_start(&self, total_pages: usize) {
        self.push(format!("start {total_pages}"));
    }
    fn on_page_complete(&self, page_num: usize, _total_pages: usize, records: usize) {
        self.push(format!("page {page_num} ok {records}"));
    }
    fn on_page_error(&self, page_num: usize, _total_pages: usize, _error: &str) {
        self.push(format!("page {page_num} err"));
    }
    fn on_extraction_complete(&self, total_pages: usize, total_records: usize) {
        self.push(format!("done {total_pages} {total_records}"));
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn header_row_is_dropped_and_row_becomes_record() {
    let decoder = MemoryDecoder::new(vec![listing(&[["Stevenson", "Hall 2", "101", "Double", "450"]])]);

    let rooms = assert_ok!(extract_rooms(PDF, &decoder, &ExtractionConfig::default()).await);

    assert_eq!(
        rooms,
        vec![RoomRecord::new("Stevenson", "Hall 2", "101", "Double", "450")]
    );
}

#[tokio::test]
async fn blocked_college_name_shifts_fields_left() {
    // "Dorm A" contains a blocked word, so the remaining four cells move up
    // one column and the record is left without a square footage.
    let decoder = MemoryDecoder::new(vec![listing(&[["Dorm A", "Hall 2", "101", "Double", "450"]])]);

    let rooms = assert_ok!(extract_rooms(PDF, &decoder, &ExtractionConfig::default()).await);

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].college.as_deref(), Some("Hall 2"));
    assert_eq!(rooms[0].building.as_deref(), Some("101"));
    assert_eq!(rooms[0].room.as_deref(), Some("Double"));
    assert_eq!(rooms[0].room_type.as_deref(), Some("450"));
    assert_eq!(rooms[0].sqft, None);
}

#[tokio::test]
async fn values_are_not_trimmed() {
    let decoder = MemoryDecoder::new(vec![MemoryPage::new([
        " Oakes ", "D", "7", "Single", "99 ",
    ])]);

    let rooms = assert_ok!(extract_rooms(PDF, &decoder, &ExtractionConfig::default()).await);

    assert_eq!(rooms[0].college.as_deref(), Some(" Oakes "));
    assert_eq!(rooms[0].sqft.as_deref(), Some("99 "));
}

#[tokio::test]
async fn page_boundaries_restart_grouping() {
    // Page 1 has 7 data tokens: one full record and a 2-field partial. Page 2
    // starts a fresh record rather than continuing the partial one.
    let decoder = MemoryDecoder::new(vec![
        MemoryPage::new(["Kresge", "E", "1", "Single", "100", "Kresge", "E"]),
        MemoryPage::new(["Crown", "F", "2", "Double", "200"]),
    ]);

    let output = assert_ok!(extract(PDF, &decoder, &ExtractionConfig::default()).await);

    assert_eq!(output.rooms.len(), 3);
    assert_eq!(output.rooms[1].filled(), 2);
    assert_eq!(
        output.rooms[2],
        RoomRecord::new("Crown", "F", "2", "Double", "200")
    );
    assert_eq!(output.stats.partial_records, 1);
}

#[tokio::test]
async fn discard_policy_drops_partial_tail() {
    let decoder = MemoryDecoder::new(vec![MemoryPage::new([
        "Kresge", "E", "1", "Single", "100", "Kresge", "E",
    ])]);
    let config = assert_ok!(ExtractionConfig::builder()
        .partial_records(PartialRecords::Discard)
        .build());

    let rooms = assert_ok!(extract_rooms(PDF, &decoder, &config).await);

    assert_eq!(rooms, vec![RoomRecord::new("Kresge", "E", "1", "Single", "100")]);
}

#[tokio::test]
async fn empty_document_yields_empty_list() {
    let decoder = MemoryDecoder::new(vec![]);

    let output = assert_ok!(extract(PDF, &decoder, &ExtractionConfig::default()).await);

    assert!(output.rooms.is_empty());
    assert!(output.pages.is_empty());
    assert_eq!(output.stats.total_pages, 0);
}

#[tokio::test]
async fn header_only_pages_contribute_nothing() {
    let decoder = MemoryDecoder::new(vec![listing(&[]), listing(&[])]);

    let output = assert_ok!(extract(PDF, &decoder, &ExtractionConfig::default()).await);

    assert!(output.rooms.is_empty());
    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.stats.total_tokens, 10);
    assert_eq!(output.stats.data_tokens, 0);
}

// ── Ordering ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_order_is_independent_of_completion_timing() {
    let output = assert_ok!(extract(PDF, &reversed_timing(), &ExtractionConfig::default()).await);

    assert_eq!(colleges(&output.rooms), vec!["Cowell", "Merrill", "Porter"]);
    let order: Vec<usize> = output.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[tokio::test]
async fn completion_order_appends_as_pages_finish() {
    let config = assert_ok!(ExtractionConfig::builder()
        .merge_order(MergeOrder::Completion)
        .build());

    let output = assert_ok!(extract(PDF, &reversed_timing(), &config).await);

    assert_eq!(colleges(&output.rooms), vec!["Porter", "Merrill", "Cowell"]);
}

#[tokio::test]
async fn concurrency_limit_still_covers_every_page() {
    let config = assert_ok!(ExtractionConfig::builder().concurrency(1).build());

    let output = assert_ok!(extract(PDF, &reversed_timing(), &config).await);

    assert_eq!(colleges(&output.rooms), vec!["Cowell", "Merrill", "Porter"]);
}

#[tokio::test]
async fn repeated_extraction_is_identical() {
    let decoder = reversed_timing();
    let config = ExtractionConfig::default();

    let first = assert_ok!(extract_rooms(PDF, &decoder, &config).await);
    let second = assert_ok!(extract_rooms(PDF, &decoder, &config).await);

    assert_eq!(first, second);
    assert_eq!(decoder.open_count(), 2);
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_failed_page_fails_the_document() {
    let decoder = MemoryDecoder::new(vec![
        listing(&[["Cowell", "A", "101", "Single", "120"]]),
        listing(&[["Merrill", "B", "202", "Double", "240"]]),
        MemoryPage::new(["ignored"]).failing("content stream truncated"),
    ]);

    let err = assert_err!(extract(PDF, &decoder, &ExtractionConfig::default()).await);

    assert_eq!(err.page(), Some(3));
    assert!(matches!(
        err,
        ExtractError::PageRetrieval {
            source: DecoderError::Backend(_),
            ..
        }
    ));
}

#[tokio::test]
async fn first_failure_wins_without_waiting_for_slow_pages() {
    let decoder = MemoryDecoder::new(vec![
        listing(&[["Cowell", "A", "101", "Single", "120"]]).with_delay(Duration::from_secs(30)),
        MemoryPage::new(["ignored"]).failing("unreadable"),
    ]);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        extract(PDF, &decoder, &ExtractionConfig::default()),
    )
    .await;

    let err = assert_err!(assert_ok!(result));
    assert_eq!(err.page(), Some(2));
}

#[tokio::test]
async fn unparseable_bytes_fail_to_open() {
    let decoder = MemoryDecoder::new(vec![listing(&[])]);

    let err = assert_err!(extract(b"<html></html>", &decoder, &ExtractionConfig::default()).await);

    assert!(matches!(err, ExtractError::DocumentOpen { .. }));
    assert_eq!(err.page(), None);
}

#[tokio::test]
async fn decoder_open_errors_are_wrapped() {
    let decoder = MemoryDecoder::new(vec![]).failing_open(DecoderError::PasswordRequired);

    let err = assert_err!(extract(PDF, &decoder, &ExtractionConfig::default()).await);

    assert!(matches!(
        err,
        ExtractError::DocumentOpen {
            source: DecoderError::PasswordRequired
        }
    ));
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_pdf_upload_never_reaches_decoder() {
    let decoder = MemoryDecoder::new(vec![listing(&[["Cowell", "A", "101", "Single", "120"]])]);
    let upload = PdfUpload::new("rooms.png", "image/png", PDF.to_vec());

    let err = assert_err!(extract_upload(&upload, &decoder, &ExtractionConfig::default()).await);

    assert!(matches!(err, ExtractError::InvalidFileType { .. }));
    assert_eq!(decoder.open_count(), 0);
}

#[tokio::test]
async fn extract_file_reads_from_disk() {
    let mut file = assert_ok!(tempfile::Builder::new().suffix(".pdf").tempfile());
    assert_ok!(file.write_all(PDF));
    let decoder = MemoryDecoder::new(vec![listing(&[["Nine", "G", "9", "Single", "90"]])]);

    let output = assert_ok!(extract_file(file.path(), &decoder, &ExtractionConfig::default()).await);

    assert_eq!(colleges(&output.rooms), vec!["Nine"]);
}

#[tokio::test]
async fn extract_file_rejects_other_extensions() {
    let mut file = assert_ok!(tempfile::Builder::new().suffix(".txt").tempfile());
    assert_ok!(file.write_all(PDF));
    let decoder = MemoryDecoder::new(vec![]);

    let err = assert_err!(extract_file(file.path(), &decoder, &ExtractionConfig::default()).await);

    assert!(matches!(err, ExtractError::InvalidFileType { ref mime_type, .. } if mime_type == "text/plain"));
    assert_eq!(decoder.open_count(), 0);
}

#[tokio::test]
async fn presenter_is_cleared_then_filled() {
    let decoder = MemoryDecoder::new(vec![
        listing(&[["Cowell", "A", "101", "Single", "120"]]),
        listing(&[["Cowell", "B", "202", "Double", "240"]]),
    ]);
    let upload = PdfUpload::new("rooms.pdf", PDF_MIME_TYPE, PDF.to_vec());
    let mut presenter = RecordingPresenter::default();

    assert_ok!(parse_upload(&upload, &decoder, &ExtractionConfig::default(), &mut presenter).await);

    assert_eq!(
        presenter.calls,
        vec!["clear_table", "clear_stats", "show_rooms", "show_stats"]
    );
    assert_eq!(presenter.rooms.len(), 2);
    let stats = presenter.stats.unwrap_or_default();
    assert_eq!(stats.by_college.get("Cowell"), Some(&2));
    assert_eq!(stats.square_footage.map(|s| s.mean), Some(180.0));
}

#[tokio::test]
async fn presenter_alerted_for_non_pdf() {
    let decoder = MemoryDecoder::new(vec![]);
    let upload = PdfUpload::new("rooms.xlsx", "application/vnd.ms-excel", vec![]);
    let mut presenter = RecordingPresenter::default();

    assert_err!(parse_upload(&upload, &decoder, &ExtractionConfig::default(), &mut presenter).await);

    assert_eq!(presenter.calls, vec!["alert: Please upload a PDF file."]);
}

// ── Streaming and progress ───────────────────────────────────────────────────

#[tokio::test]
async fn stream_yields_every_page_once() {
    let stream = assert_ok!(extract_stream(PDF, &reversed_timing(), &ExtractionConfig::default()).await);

    let mut pages: Vec<PageRooms> = assert_ok!(stream.try_collect().await);
    assert_eq!(pages[0].page_num, 3);

    pages.sort_by_key(|p| p.page_num);
    let rooms: Vec<RoomRecord> = pages.into_iter().flat_map(|p| p.records).collect();
    assert_eq!(colleges(&rooms), vec!["Cowell", "Merrill", "Porter"]);
}

#[tokio::test]
async fn progress_events_follow_completion() {
    let log = Arc::new(EventLog::default());
    let config = assert_ok!(ExtractionConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ExtractionProgressCallback>)
        .build());

    assert_ok!(extract(PDF, &reversed_timing(), &config).await);

    assert_eq!(
        log.events(),
        vec![
            "start 3",
            "page 3 ok 1",
            "page 2 ok 1",
            "page 1 ok 1",
            "done 3 3",
        ]
    );
}

#[tokio::test]
async fn progress_reports_page_error_and_no_completion() {
    let log = Arc::new(EventLog::default());
    let config = assert_ok!(ExtractionConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ExtractionProgressCallback>)
        .build());
    let decoder = MemoryDecoder::new(vec![MemoryPage::new(["x"]).failing("bad")]);

    assert_err!(extract(PDF, &decoder, &config).await);

    assert_eq!(log.events(), vec!["start 1", "page 1 err"]);
}

#[test]
fn output_serialises_type_key() {
    let record = RoomRecord::new("Cowell", "A", "101", "Single", "120");
    let json = serde_json::to_value(&record).unwrap_or_default();
    assert_eq!(json["type"], "Single");
    assert!(json.get("room_type").is_none());
}
