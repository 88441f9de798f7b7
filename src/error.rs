//! Error types for the podiff library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CompareError`] — **Fatal**: the comparison cannot proceed at all
//!   (missing API key, unreadable input, provider rejection). Returned as
//!   `Err(CompareError)` from the top-level `compare*` functions.
//!
//! * [`ExtractError`] — **Structured extraction failure**: a single PDF
//!   could not be parsed at all (corrupt bytes, encrypted document).
//!   Wrapped into [`CompareError::ExtractionFailed`] together with the
//!   [`DocumentSide`](crate::output::DocumentSide) it came from, so the
//!   caller can tell the user *which* upload to fix.
//!
//! A page that parses but yields no text is not an error here — it simply
//! contributes an empty string, and a fully empty document surfaces as
//! [`CompareError::EmptyDocument`] before any network call is made.

use crate::output::DocumentSide;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the podiff library.
#[derive(Debug, Error)]
pub enum CompareError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The API key environment variable is unset or empty.
    #[error("API key not found: environment variable '{var}' is unset or empty.\nTry: export {var}=<your key>")]
    MissingApiKey { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be parsed at all.
    #[error("Could not read the {side}: {source}")]
    ExtractionFailed {
        side: DocumentSide,
        #[source]
        source: ExtractError,
    },

    /// The PDF parsed but no page yielded any text (scanned/image-only
    /// documents are the usual cause).
    #[error("Could not extract text from the {side}.\nScanned or image-only PDFs carry no extractable text.")]
    EmptyDocument { side: DocumentSide },

    // ── Completion API errors ─────────────────────────────────────────────
    /// The provider rejected the request body as too large (HTTP 413).
    ///
    /// The per-document character truncation bounds each text insertion but
    /// not the request as a whole, so this can still occur.
    #[error("Document too large. Try splitting into smaller sections.")]
    PayloadTooLarge,

    /// Any other non-2xx response; carries the provider's raw error body.
    #[error("API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// The completion call exceeded the configured timeout.
    #[error("Completion request timed out after {secs}s.\nIncrease --timeout or try a smaller document.")]
    ApiTimeout { secs: u64 },

    /// Network-level failure before any HTTP status was received.
    #[error("Completion request failed: {reason}\nCheck your internet connection.")]
    RequestFailed { reason: String },

    /// The response was 2xx but did not contain `choices[0].message.content`.
    #[error("Unexpected completion response shape: {detail}")]
    UnexpectedResponse { detail: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// Assembling or serialising the report PDF failed.
    #[error("Failed to render the report PDF: {detail}")]
    RenderFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a PDF could not be parsed.
///
/// Carried inside [`CompareError::ExtractionFailed`]. The split lets the
/// caller give targeted advice: a corrupt file wants re-exporting, an
/// encrypted one wants its password removed first.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Header/xref/object structure could not be parsed.
    #[error("the PDF is corrupt or uses an unsupported structure ({detail})")]
    Corrupt { detail: String },

    /// The document is encrypted; decryption is not attempted.
    #[error("the PDF is encrypted; remove the password and re-upload")]
    Encrypted,
}
