// src/pdf_text.rs

use lopdf::{Dictionary, Document};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// What a local look at an uploaded PDF found.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF carries a usable text layer.
    Text(String),
    /// Image-only pages; only the analysis service can read it.
    ScannedImage,
    /// Not parseable as a PDF at all.
    Error(String),
}

impl PdfContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            PdfContent::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Fewer non-whitespace characters than this counts as no text layer.
const MIN_TEXT_CHARS: usize = 30;

/// Share of image-only pages above which the whole file counts as scanned.
const SCANNED_PAGE_RATIO: f64 = 0.8;

/// Classify `pdf_bytes` and pull its text layer if it has one.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned");
        return PdfContent::ScannedImage;
    }

    match ::pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => {
            let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
            if meaningful < MIN_TEXT_CHARS {
                info!(chars = meaningful, "Text layer too short, treating as scanned");
                PdfContent::ScannedImage
            } else {
                info!(chars = meaningful, "Text layer extracted");
                PdfContent::Text(text)
            }
        }
        Err(e) => {
            warn!(error = %e, "Text extraction failed, treating as scanned");
            PdfContent::ScannedImage
        }
    }
}

/// Reject uploads that are not PDFs before anything is sent anywhere.
pub fn ensure_pdf(name: &str, pdf_bytes: &[u8]) -> Result<PdfContent> {
    match extract_text_from_pdf(pdf_bytes) {
        PdfContent::Error(e) => {
            warn!(file = %name, error = %e, "Upload rejected");
            Err(Error::NotPdf(format!("{name}: {e}")))
        }
        content => Ok(content),
    }
}

/// A page with image XObjects but no fonts is a scanned page. A W-9 that
/// was printed, signed by hand and scanned back is the common case.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false;
    }

    let image_only = pages
        .values()
        .filter_map(|id| doc.get_object(*id).ok()?.as_dict().ok())
        .filter(|page| {
            !has_resource(doc, page, b"Font") && has_resource(doc, page, b"XObject")
        })
        .count();

    let ratio = image_only as f64 / pages.len() as f64;
    info!(
        total_pages = pages.len(),
        image_only,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );
    ratio >= SCANNED_PAGE_RATIO
}

/// Whether the page's `Resources` has a non-empty `kind` dictionary.
fn has_resource(doc: &Document, page: &Dictionary, kind: &[u8]) -> bool {
    page.get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, resources)| resources.as_dict().ok())
        .and_then(|resources| resources.get(kind).ok())
        .and_then(|entry| doc.dereference(entry).ok())
        .and_then(|(_, entry)| entry.as_dict().ok())
        .is_some_and(|dict| !dict.is_empty())
}
