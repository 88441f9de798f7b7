//! Text extraction: pull plain text from a bounded number of PDF pages.
//!
//! Extraction quality depends entirely on the PDF's internal encoding —
//! scanned or image-only pages carry no text operators and yield empty
//! strings. That is deliberately not an error at this level: one bad page
//! must not lose the rest of the document. Only a document that cannot be
//! parsed at all (corrupt bytes, encryption) fails, with a structured
//! [`ExtractError`] so the caller can say *why*.

use crate::error::ExtractError;
use lopdf::Document;
use tracing::{debug, warn};

/// Default cap on the number of pages read per document.
pub const DEFAULT_PAGE_CAP: usize = 10;

/// Text pulled from one PDF, with enough bookkeeping to observe the cap.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Per-page texts joined with `\n`, in document order.
    pub text: String,
    /// Pages actually read (≤ `total_pages`, ≤ the cap).
    pub pages_read: usize,
    /// Pages in the document.
    pub total_pages: usize,
}

impl ExtractedText {
    /// True when no page yielded any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract text from the first `max_pages` pages of a PDF byte stream.
///
/// Pages are visited in document order; pages beyond the cap are dropped
/// silently. A page whose content streams cannot be decoded contributes an
/// empty string and a warning log line rather than failing the document.
///
/// # Errors
/// [`ExtractError::Corrupt`] when the byte stream is not parseable as a
/// PDF, [`ExtractError::Encrypted`] when the document requires a password.
pub fn extract_text(bytes: &[u8], max_pages: usize) -> Result<ExtractedText, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Corrupt {
        detail: e.to_string(),
    })?;

    if doc.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    let pages = doc.get_pages();
    let total_pages = pages.len();

    let mut page_texts: Vec<String> = Vec::with_capacity(max_pages.min(total_pages));
    for (&page_num, _object_id) in pages.iter().take(max_pages) {
        match doc.extract_text(&[page_num]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                warn!("Page {}: text extraction failed — {}", page_num, e);
                page_texts.push(String::new());
            }
        }
    }

    let pages_read = page_texts.len();
    let text = page_texts.join("\n");
    debug!(
        "Extracted {} chars from {}/{} pages",
        text.chars().count(),
        pages_read,
        total_pages
    );

    Ok(ExtractedText {
        text,
        pages_read,
        total_pages,
    })
}
