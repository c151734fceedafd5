//! Extraction entry points.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is
//! CPU-bound and not safe to drive from async contexts.
//! `tokio::task::spawn_blocking` moves the whole per-document pipeline onto
//! a dedicated blocking thread, so async callers are never stalled while a
//! large document is parsed. Within that thread the pipeline is strictly
//! synchronous and pages are processed in ascending order — page numbering
//! and asset-id derivation are positional and must be deterministic.
//!
//! Multiple documents may be extracted concurrently from independent tasks;
//! the only shared state between them is the [`AssetCache`] passed in by
//! reference.

use crate::assets::AssetCache;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{DocumentMetadata, DocumentValidation, ExtractionResult, PageContent};
use crate::pipeline::{input, loader, page, validate};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Extract structured page content from a PDF file.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `path`   — Local path to a PDF file
/// * `config` — Extraction configuration (token, validation toggle, …)
/// * `assets` — The process-wide asset cache receiving extracted images
///
/// # Returns
/// `Ok(ExtractionResult)` with exactly `page_count` pages, even when some
/// pages faulted (those are included as ERROR placeholders — check
/// `result.validation` and per-page statuses).
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal conditions: unreadable input,
/// not a PDF, password problems, a document pdfium cannot parse at all, or
/// a missing pdfium library.
pub async fn extract(
    path: impl AsRef<str>,
    config: &ExtractionConfig,
    assets: &Arc<AssetCache>,
) -> Result<ExtractionResult, ExtractError> {
    let path_str = path.as_ref();
    info!("starting extraction: {}", path_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_input(path_str)?;

    // ── Step 2: Run the blocking pipeline ────────────────────────────────
    let config = config.clone();
    let assets = Arc::clone(assets);
    tokio::task::spawn_blocking(move || extract_blocking(&pdf_path, &config, &assets))
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task panicked: {}", e)))?
}

/// Blocking implementation of the full pipeline for one document.
fn extract_blocking(
    pdf_path: &Path,
    config: &ExtractionConfig,
    assets: &AssetCache,
) -> Result<ExtractionResult, ExtractError> {
    let total_start = Instant::now();

    // ── Step 1: Open the document (the single fatal stage) ───────────────
    let loader = loader::Loader::new()?;
    let document = loader.open(pdf_path, config.password.as_deref())?;
    let page_count = document.pages().len() as usize;

    // ── Step 2: Derive the asset-namespace token ─────────────────────────
    let token = config
        .token
        .clone()
        .unwrap_or_else(|| default_token(pdf_path));

    // ── Step 3: Document validation ──────────────────────────────────────
    let validation = if config.validate {
        validate::validate_document(&document, config)
    } else {
        DocumentValidation::assumed_valid(page_count)
    };

    // ── Step 4: Document metadata ────────────────────────────────────────
    let metadata = loader::document_metadata(&document, config.password.is_some());

    if let Some(ref cb) = config.progress {
        cb.on_extraction_start(page_count);
    }

    // ── Step 5: Extract pages strictly in order ──────────────────────────
    let mut pages: Vec<PageContent> = Vec::with_capacity(page_count);
    let mut faulted = 0usize;

    for index in 0..page_count {
        match page::extract_page(&document, index, &token, config, assets) {
            Ok(content) => {
                if let Some(ref cb) = config.progress {
                    cb.on_page_extracted(content.number, page_count, content.text.len());
                }
                pages.push(content);
            }
            Err(fault) => {
                // The page is recorded, never dropped: the result always
                // holds exactly page_count entries.
                warn!("{}", fault);
                faulted += 1;
                if let Some(ref cb) = config.progress {
                    cb.on_page_error(fault.page(), page_count, fault.to_string());
                }
                pages.push(PageContent::faulted(fault.page()));
            }
        }
    }

    if let Some(ref cb) = config.progress {
        cb.on_extraction_complete(page_count, faulted);
    }

    info!(
        "extraction complete: {} pages ({} faulted) in {}ms",
        page_count,
        faulted,
        total_start.elapsed().as_millis()
    );

    // `document` drops here: the document closes on every path once it was
    // successfully opened.
    Ok(ExtractionResult {
        pages,
        page_count,
        validation,
        metadata,
    })
}

/// Extract from PDF bytes in memory.
///
/// Internally the library writes `bytes` to a managed [`tempfile`] and
/// cleans it up automatically on return or panic. This is the recommended
/// API when PDF data arrives as an upload or from a database rather than a
/// file on disk.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
    assets: &Arc<AssetCache>,
) -> Result<ExtractionResult, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config, assets).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    path: impl AsRef<str>,
    config: &ExtractionConfig,
    assets: &Arc<AssetCache>,
) -> Result<ExtractionResult, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(path, config, assets))
}

/// Read document metadata without extracting content.
pub async fn inspect(path: impl AsRef<str>) -> Result<DocumentMetadata, ExtractError> {
    let pdf_path = input::resolve_input(path.as_ref())?;

    tokio::task::spawn_blocking(move || {
        let loader = loader::Loader::new()?;
        let document = loader.open(&pdf_path, None)?;
        Ok(loader::document_metadata(&document, false))
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("inspect task panicked: {}", e)))?
}

/// Page count plus a reliability probe, for callers that want to check
/// feasibility before paying for a full extraction.
///
/// Anything wrong with the document itself — missing file, not a PDF, a
/// file pdfium cannot open, a failing first/last page — yields
/// `(0-or-count, false)` rather than an error; only an unusable pdfium
/// installation is fatal.
pub async fn page_count_with_reliability(
    path: impl AsRef<str>,
) -> Result<(usize, bool), ExtractError> {
    let path_str = path.as_ref().to_string();

    tokio::task::spawn_blocking(move || {
        let loader = loader::Loader::new()?;
        let pdf_path = match input::resolve_input(&path_str) {
            Ok(p) => p,
            Err(_) => return Ok((0, false)),
        };
        Ok(loader.page_count_with_reliability(&pdf_path, None))
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("probe task panicked: {}", e)))?
}

/// Default asset-namespace token: a short blake3 digest of the path.
///
/// Deterministic per path so repeated extractions of the same document
/// produce the same asset ids.
fn default_token(path: &Path) -> String {
    let digest = blake3::hash(path.to_string_lossy().as_bytes());
    digest.to_hex()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_is_deterministic() {
        let a = default_token(Path::new("/tmp/report.pdf"));
        let b = default_token(Path::new("/tmp/report.pdf"));
        let c = default_token(Path::new("/tmp/other.pdf"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn extract_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Arc::new(AssetCache::new(dir.path().join("assets"), 4).unwrap());
        let config = ExtractionConfig::default();
        let err = extract("/definitely/not/a/real/file.pdf", &config, &assets)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn extract_from_bytes_rejects_non_pdf_payload() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Arc::new(AssetCache::new(dir.path().join("assets"), 4).unwrap());
        let config = ExtractionConfig::default();
        let err = extract_from_bytes(b"this is not a pdf at all", &config, &assets)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn probe_on_missing_file_is_unreliable_not_fatal() {
        // Input problems are a (0, false) probe result, not an error —
        // only a missing pdfium library would be fatal here, and binding is
        // attempted first, so skip when the engine is unavailable.
        match page_count_with_reliability("/definitely/not/a/real/file.pdf").await {
            Ok((count, reliable)) => {
                assert_eq!(count, 0);
                assert!(!reliable);
            }
            Err(ExtractError::PdfiumBindingFailed(_)) => {
                eprintln!("SKIP — pdfium library not available");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
