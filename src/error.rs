//! Error types for the pagelift library.
//!
//! Three distinct error types reflect three distinct failure granularities:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (bad input file, wrong password, pdfium not available). Returned as
//!   `Err(ExtractError)` from the top-level entry points. Failing to open
//!   the document is the only fatal failure mode in the pipeline.
//!
//! * [`PageFault`] — **Non-fatal, page-scoped**: a single page could not be
//!   used at all (load or text extraction failed). Converted by the
//!   orchestrator into a page with empty content and ERROR status so the
//!   remaining pages are still collected.
//!
//! * [`AssetError`] — **Non-fatal, asset-scoped**: one embedded image failed
//!   to decode, encode, or persist. Logged and skipped; neither the image
//!   loop nor the page fails because of it.
//!
//! The separation keeps the propagation policy visible in the signatures:
//! only `ExtractError` crosses the public API as an `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pagelift library.
///
/// Page-level failures use [`PageFault`] and asset-level failures use
/// [`AssetError`]; both are contained inside the pipeline rather than
/// propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Cache errors ──────────────────────────────────────────────────────
    /// The asset cache directory could not be created.
    #[error("Failed to create asset cache directory '{path}': {source}")]
    CacheDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PAGELIFT_PDFIUM_PATH=/path/to/libpdfium (file or directory) to use a\n\
specific copy, or install pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal fault confined to a single page.
///
/// The orchestrator converts a `PageFault` into a [`crate::output::PageContent`]
/// with empty text, no images, zeroed metadata, and ERROR status — the
/// document-wide extraction continues to the next page.
#[derive(Debug, Clone, Error)]
pub enum PageFault {
    /// The page object could not be loaded from the document.
    #[error("Page {page}: load failed: {detail}")]
    LoadFailed { page: usize, detail: String },

    /// The page loaded but its text could not be extracted.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextFailed { page: usize, detail: String },
}

impl PageFault {
    /// The 1-indexed page this fault belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageFault::LoadFailed { page, .. } | PageFault::TextFailed { page, .. } => *page,
        }
    }
}

/// A non-fatal fault confined to a single embedded asset.
///
/// Logged at WARN and skipped; the surrounding image loop continues.
#[derive(Debug, Error)]
pub enum AssetError {
    /// pdfium could not decode the embedded image object.
    #[error("image {index} on page {page}: decode failed: {detail}")]
    DecodeFailed {
        page: usize,
        index: usize,
        detail: String,
    },

    /// The decoded bitmap could not be re-encoded for storage.
    #[error("image {index} on page {page}: encode failed: {source}")]
    EncodeFailed {
        page: usize,
        index: usize,
        #[source]
        source: image::ImageError,
    },

    /// The payload could not be written to the cache's backing store.
    #[error("failed to write asset '{id}': {source}")]
    WriteFailed {
        id: String,
        #[source]
        source: std::io::Error,
    },
}
