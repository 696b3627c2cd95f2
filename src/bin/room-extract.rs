//! CLI binary for room-extract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, binds pdfium, and prints the room table.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use room_extract::{
    parse_upload, ExtractionConfig, ExtractionProgressCallback, MergeOrder, PartialRecords,
    PdfUpload, PdfiumDecoder, PdfiumLibrary, ProgressCallback, RoomField, RoomPresenter,
    RoomRecord, RoomStats,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback. Pages finish out of order, so each line names
/// its page and the bar only counts.
struct CliProgressCallback {
    bar: ProgressBar,
    records: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_extraction_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            records: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Reading");
        self.bar.set_message("");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_complete(&self, page_num: usize, total: usize, records: usize) {
        let so_far = self.records.fetch_add(records, Ordering::SeqCst) + records;
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{records:>4} rooms")),
        ));
        self.bar.set_message(format!("{so_far} rooms"));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_extraction_complete(&self, total_pages: usize, total_records: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} rooms from {} pages",
            green("✔"),
            bold(&total_records.to_string()),
            total_pages
        );
    }
}

// ── Terminal presenter ───────────────────────────────────────────────────────

/// Prints the room table and statistics to stdout.
struct TerminalPresenter {
    /// When false only the alert is shown (JSON mode prints the output itself).
    show: bool,
}

impl RoomPresenter for TerminalPresenter {
    fn clear_table(&mut self) {}

    fn clear_stats(&mut self) {}

    fn show_rooms(&mut self, rooms: &[RoomRecord]) {
        if self.show {
            print!("{}", render_table(rooms));
        }
    }

    fn show_stats(&mut self, stats: &RoomStats) {
        if self.show {
            print!("{}", render_stats(stats));
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{} {}", red("✘"), bold(message));
    }
}

fn cell(record: &RoomRecord, field: RoomField) -> &str {
    record.get(field).map(str::trim).unwrap_or("")
}

fn render_table(rooms: &[RoomRecord]) -> String {
    let headers = ["College", "Building", "Room", "Type", "Sq. Ft."];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for room in rooms {
        for (i, field) in RoomField::ALL.iter().enumerate() {
            widths[i] = widths[i].max(cell(room, *field).chars().count());
        }
    }

    let row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&row(headers.to_vec()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for room in rooms {
        out.push_str(&row(RoomField::ALL.iter().map(|f| cell(room, *f)).collect()));
        out.push('\n');
    }
    out
}

fn render_stats(stats: &RoomStats) -> String {
    let mut out = format!(
        "\nRooms: {} ({} complete, {} partial)\n",
        stats.total_rooms, stats.complete_rooms, stats.partial_rooms
    );
    if !stats.by_college.is_empty() {
        out.push_str("By college:\n");
        for (college, n) in &stats.by_college {
            out.push_str(&format!("  {college:<24} {n:>5}\n"));
        }
    }
    if !stats.by_type.is_empty() {
        out.push_str("By type:\n");
        for (kind, n) in &stats.by_type {
            out.push_str(&format!("  {kind:<24} {n:>5}\n"));
        }
    }
    if let Some(sqft) = stats.square_footage {
        out.push_str(&format!(
            "Square footage ({} rooms): min {:.0}  max {:.0}  mean {:.1}\n",
            sqft.counted, sqft.min, sqft.max, sqft.mean
        ));
    }
    out
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the room table and statistics
  room-extract rooms.pdf

  # JSON output (rooms, per-page results, extraction stats)
  room-extract --json rooms.pdf > rooms.json

  # Reproduce completion-order merging and drop trailing partial rows
  room-extract --merge-order completion --drop-partial rooms.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Override the tracing filter

  Without PDFIUM_LIB_PATH, libpdfium is looked up in the current directory,
  then through the system dynamic loader.
"#;

/// Extract campus housing room records from PDF room lists.
#[derive(Parser, Debug)]
#[command(
    name = "room-extract",
    version,
    about = "Extract campus housing room records from PDF room lists",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF room list to read.
    input: PathBuf,

    /// Output structured JSON (ExtractionOutput) instead of a table.
    #[arg(long, env = "ROOM_EXTRACT_JSON")]
    json: bool,

    /// Maximum page retrievals in flight (default: all pages at once).
    #[arg(short, long, env = "ROOM_EXTRACT_CONCURRENCY",
          value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// Order in which page results are concatenated.
    #[arg(long, env = "ROOM_EXTRACT_MERGE_ORDER", value_enum, default_value = "page")]
    merge_order: MergeOrderArg,

    /// Drop a page's trailing record when it has fewer than five fields.
    #[arg(long, env = "ROOM_EXTRACT_DROP_PARTIAL")]
    drop_partial: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "ROOM_EXTRACT_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "ROOM_EXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ROOM_EXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "ROOM_EXTRACT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum MergeOrderArg {
    Page,
    Completion,
}

impl From<MergeOrderArg> for MergeOrder {
    fn from(v: MergeOrderArg) -> Self {
        match v {
            MergeOrderArg::Page => MergeOrder::PageNumber,
            MergeOrderArg::Completion => MergeOrder::Completion,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs when it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Bind pdfium ──────────────────────────────────────────────────────
    let library = match cli.pdfium_lib {
        Some(ref path) => PdfiumLibrary::Path(path.clone()),
        None => PdfiumLibrary::Auto,
    };
    let decoder = tokio::task::block_in_place(|| PdfiumDecoder::initialize(library))
        .context("Failed to initialise PDF engine")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let upload = PdfUpload::from_path(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut presenter = TerminalPresenter { show: !cli.json };
    let output = parse_upload(&upload, &decoder, &config, &mut presenter)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "{} {} rooms from {} pages in {}ms",
            cyan("◆"),
            output.stats.total_records,
            output.stats.total_pages,
            output.stats.duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .merge_order(cli.merge_order.into())
        .partial_records(if cli.drop_partial {
            PartialRecords::Discard
        } else {
            PartialRecords::Keep
        });

    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n as usize);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
