//! pdfium-backed decoder.
//!
//! ## Threading
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on Tokio worker threads. Every opened document is
//! therefore owned by a dedicated worker thread. The async side sends page
//! requests over an unbounded channel and awaits a `oneshot` reply per
//! request, so each page future resolves on its own schedule. Dropping the
//! document handle closes the channel and the worker exits.
//!
//! ## Initialisation
//!
//! Locating and binding the pdfium shared library happens once, at process
//! startup, through [`PdfiumDecoder::initialize`]. Extraction itself never
//! touches library configuration.
//!
//! ## Text items
//!
//! A page's text items are its text objects in content-stream order, one item
//! per object, which matches how table cells are emitted by the generators
//! that produce housing listings. Form XObjects are walked in place, so cells
//! drawn through `Do` (n-up, imposition and merge tools) keep their position
//! in the sequence.

use crate::decoder::{check_page, PdfDecoder, PdfDocument, PdfPage, TextContent, TextItem};
use crate::error::{DecoderError, ExtractError};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Environment variable naming an existing pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Where to find the pdfium shared library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// `PDFIUM_LIB_PATH`, then the current directory, then the system loader.
    #[default]
    Auto,
    /// An explicit library file.
    Path(PathBuf),
    /// Whatever the system dynamic loader finds.
    System,
}

/// A resolved, verified binding target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Library(PathBuf),
    System,
}

impl Binding {
    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match self {
            Binding::Library(path) => Pdfium::bind_to_library(path)?,
            Binding::System => Pdfium::bind_to_system_library()?,
        };
        Ok(Pdfium::new(bindings))
    }
}

/// Production [`PdfDecoder`] built on pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumDecoder {
    binding: Binding,
}

impl PdfiumDecoder {
    /// Resolve and bind the pdfium library once.
    ///
    /// Call this at startup; the returned decoder can open any number of
    /// documents. Blocking: it loads a shared library.
    pub fn initialize(library: PdfiumLibrary) -> Result<Self, ExtractError> {
        let binding = resolve_binding(&library);
        binding
            .bind()
            .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;
        info!("pdfium bound: {:?}", binding);
        Ok(Self { binding })
    }
}

fn resolve_binding(library: &PdfiumLibrary) -> Binding {
    match library {
        PdfiumLibrary::Path(path) => Binding::Library(path.clone()),
        PdfiumLibrary::System => Binding::System,
        PdfiumLibrary::Auto => {
            if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
                let p = PathBuf::from(p);
                if p.exists() {
                    return Binding::Library(p);
                }
                warn!("{} '{}' not found; searching further", PDFIUM_LIB_PATH_ENV, p.display());
            }
            let local = PathBuf::from(Pdfium::pdfium_platform_library_name_at_path("./"));
            if local.exists() {
                Binding::Library(local)
            } else {
                Binding::System
            }
        }
    }
}

#[async_trait]
impl PdfDecoder for PdfiumDecoder {
    async fn open_document(
        &self,
        bytes: Vec<u8>,
        password: Option<&str>,
    ) -> Result<Arc<dyn PdfDocument>, DecoderError> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (opened_tx, opened_rx) = oneshot::channel();
        let binding = self.binding.clone();
        let password = password.map(str::to_owned);

        std::thread::Builder::new()
            .name("pdfium-worker".into())
            .spawn(move || run_worker(binding, bytes, password, opened_tx, request_rx))
            .map_err(|e| DecoderError::Backend(format!("failed to start pdfium worker: {e}")))?;

        let page_count = opened_rx
            .await
            .map_err(|_| DecoderError::WorkerUnavailable)??;

        Ok(Arc::new(PdfiumDocument {
            page_count,
            requests: request_tx,
        }))
    }
}

enum WorkerRequest {
    PageText {
        page_num: usize,
        reply: oneshot::Sender<Result<TextContent, DecoderError>>,
    },
}

/// Worker thread body: open the document, report its page count, then serve
/// page requests until every handle is dropped.
fn run_worker(
    binding: Binding,
    bytes: Vec<u8>,
    password: Option<String>,
    opened: oneshot::Sender<Result<usize, DecoderError>>,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
) {
    let pdfium = match binding.bind() {
        Ok(p) => p,
        Err(e) => {
            let _ = opened.send(Err(DecoderError::Backend(format!("{:?}", e))));
            return;
        }
    };

    let document = match pdfium.load_pdf_from_byte_vec(bytes, password.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            let _ = opened.send(Err(classify_load_error(&format!("{:?}", e), password.is_some())));
            return;
        }
    };

    let pages = document.pages();
    let page_count = pages.len() as usize;
    debug!("pdfium worker: document loaded, {} pages", page_count);

    if opened.send(Ok(page_count)).is_err() {
        return;
    }

    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::PageText { page_num, reply } => {
                let result = page_text(pages, page_num, page_count);
                // The requester may have given up (another page failed first).
                let _ = reply.send(result);
            }
        }
    }
    debug!("pdfium worker: all handles dropped, exiting");
}

fn page_text(pages: &PdfPages, page_num: usize, page_count: usize) -> Result<TextContent, DecoderError> {
    check_page(page_num, page_count)?;

    let page = pages
        .get((page_num - 1) as u16)
        .map_err(|e| DecoderError::Backend(format!("{:?}", e)))?;

    let mut items = Vec::new();
    for object in page.objects().iter() {
        collect_text_items(&object, &mut items);
    }

    Ok(TextContent { items })
}

/// Append the text items of `object`, descending into form XObjects.
fn collect_text_items(object: &PdfPageObject, items: &mut Vec<TextItem>) {
    if let Some(text) = object.as_text_object() {
        items.push(TextItem::new(text.text()));
    } else if let Some(form) = object.as_x_object_form_object() {
        for child in form.iter() {
            collect_text_items(&child, items);
        }
    }
}

/// Map a pdfium load failure onto a [`DecoderError`].
fn classify_load_error(detail: &str, password_given: bool) -> DecoderError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            DecoderError::WrongPassword
        } else {
            DecoderError::PasswordRequired
        }
    } else {
        DecoderError::Malformed(detail.to_string())
    }
}

struct PdfiumDocument {
    page_count: usize,
    requests: mpsc::UnboundedSender<WorkerRequest>,
}

#[async_trait]
impl PdfDocument for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn page(&self, page_num: usize) -> Result<Box<dyn PdfPage>, DecoderError> {
        check_page(page_num, self.page_count)?;
        Ok(Box::new(PdfiumPage {
            page_num,
            requests: self.requests.clone(),
        }))
    }
}

struct PdfiumPage {
    page_num: usize,
    requests: mpsc::UnboundedSender<WorkerRequest>,
}

#[async_trait]
impl PdfPage for PdfiumPage {
    fn page_num(&self) -> usize {
        self.page_num
    }

    async fn text_content(&self) -> Result<TextContent, DecoderError> {
        let (reply, answer) = oneshot::channel();
        self.requests
            .send(WorkerRequest::PageText {
                page_num: self.page_num,
                reply,
            })
            .map_err(|_| DecoderError::WorkerUnavailable)?;
        answer.await.map_err(|_| DecoderError::WorkerUnavailable)?
    }
}
