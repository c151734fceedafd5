//! # pagelift
//!
//! Page-accurate PDF extraction with structural validation and a bounded
//! on-disk asset cache.
//!
//! ## Why this crate?
//!
//! Applications that read documents aloud, index them, or re-serve their
//! content need more than a blob of text: they need per-page text in reading
//! order, the images each page embeds, and an honest account of which pages
//! could not be trusted. pagelift opens a paginated PDF once, walks its pages
//! strictly in order, classifies each page's structural health, and persists
//! every extracted image in a bounded LRU cache — one unreadable page never
//! costs you the rest of the document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     check existence, readability, %PDF magic
//!  ├─ 2. Loader    open via pdfium, page count, document metadata
//!  ├─ 3. Validate  per-page probe render + text checks, document summary
//!  ├─ 4. Extract   per-page text, images → asset cache, derived metadata
//!  └─ 5. Result    pages 1..N, validation, metadata — always N entries
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagelift::{extract, AssetCache, ExtractionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One cache per process, shared by reference.
//!     let assets = Arc::new(AssetCache::new(AssetCache::default_dir(), 200)?);
//!     let config = ExtractionConfig::default();
//!
//!     let result = extract("document.pdf", &config, &assets).await?;
//!     println!(
//!         "{} pages, valid: {}",
//!         result.page_count, result.validation.is_valid
//!     );
//!     for page in &result.pages {
//!         println!("page {}: {} words", page.number, page.metadata.word_count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Only failing to open the document is fatal. Page faults become ERROR
//! placeholder pages, image faults are logged and skipped, and validation
//! findings are recorded as issues — the result always contains exactly
//! `page_count` pages. Callers must consult `validation.is_valid` and
//! per-page statuses before trusting any page reported as ERROR.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagelift` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pagelift = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assets;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assets::{AssetCache, AssetEntry};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{AssetError, ExtractError, PageFault};
pub use extract::{
    extract, extract_from_bytes, extract_sync, inspect, page_count_with_reliability,
};
pub use output::{
    DocumentMetadata, DocumentValidation, ExtractionResult, IssueKind, IssueSeverity,
    PageContent, PageImage, PageMetadata, ValidationIssue, ValidationStatus,
};
pub use progress::{ExtractionProgress, NoopProgress, ProgressHandle};
