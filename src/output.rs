//! Result types assembled by the extraction pipeline.
//!
//! Everything here is plain data: serde-serialisable so the HTTP layer of a
//! host application can serve an [`ExtractionResult`] as JSON without any
//! mapping layer, and immutable once produced — pages are never revised after
//! the pass that created them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reading speed used to derive [`PageMetadata::reading_time_secs`].
const WORDS_PER_MINUTE: usize = 200;

// ── Validation ───────────────────────────────────────────────────────────

/// Structural classification of a single page, set once per extraction pass.
///
/// `Valid` is the implicit initial state; a page makes at most one transition
/// to `Warning` or `Error`, and the state is terminal for that pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Warning,
    Error,
}

/// Severity of a [`ValidationIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// What kind of defect a [`ValidationIssue`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Page has neither text nor images.
    Missing,
    /// Page could not be rendered or loaded.
    Corrupt,
    /// Extracted text contains replacement characters.
    Encoding,
    Other,
}

/// A structured record of a defect found in a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 1-indexed page number the issue belongs to.
    pub page: usize,
    pub kind: IssueKind,
    /// Human-readable description.
    pub message: String,
    pub severity: IssueSeverity,
}

/// Document-level validation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentValidation {
    /// True iff no issue is ERROR-severity and every page was validated.
    pub is_valid: bool,
    pub total_pages: usize,
    /// Pages not classified ERROR. A page with only WARNING-level issues
    /// still counts.
    pub validated_pages: usize,
    /// Issues in page order, at most one per page per pass.
    pub issues: Vec<ValidationIssue>,
}

impl DocumentValidation {
    /// Build the summary from per-page results.
    ///
    /// `validated_pages` must already exclude ERROR-classified pages; this
    /// constructor derives `is_valid` from the invariant rather than trusting
    /// callers to compute it consistently.
    pub fn summarize(
        total_pages: usize,
        validated_pages: usize,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let has_errors = issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Error);
        Self {
            is_valid: !has_errors && validated_pages == total_pages,
            total_pages,
            validated_pages,
            issues,
        }
    }

    /// The trivially-valid summary used when validation is skipped.
    pub fn assumed_valid(total_pages: usize) -> Self {
        Self {
            is_valid: true,
            total_pages,
            validated_pages: total_pages,
            issues: Vec::new(),
        }
    }
}

// ── Page content ─────────────────────────────────────────────────────────

/// An embedded image lifted out of a page and persisted in the asset cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    /// Deterministic id: `{token}_p{page}_{index}.{ext}`.
    pub id: String,
    /// Backing file in the asset cache, as returned by `register`.
    pub path: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub content_type: String,
}

/// Derived metrics for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub word_count: usize,
    pub char_count: usize,
    pub has_images: bool,
    /// Estimated reading time in seconds at 200 words per minute.
    /// Zero when the page has no words.
    pub reading_time_secs: f64,
}

impl PageMetadata {
    /// Compute metrics from already-trimmed page text.
    pub fn compute(text: &str, has_images: bool) -> Self {
        let word_count = text.split_whitespace().count();
        let reading_time_secs = if word_count > 0 {
            (word_count as f64 / WORDS_PER_MINUTE as f64) * 60.0
        } else {
            0.0
        };
        Self {
            word_count,
            char_count: text.chars().count(),
            has_images,
            reading_time_secs,
        }
    }
}

/// Structured content extracted from a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// 1-indexed page number, contiguous across the result.
    pub number: usize,
    /// Text in reading order, trimmed of surrounding whitespace.
    pub text: String,
    /// Images in the order they appear on the page.
    pub images: Vec<PageImage>,
    pub metadata: PageMetadata,
    pub status: ValidationStatus,
}

impl PageContent {
    /// Whether the page carries any content at all: non-blank text or at
    /// least one extracted image.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.images.is_empty()
    }

    /// The placeholder page recorded when a page hard-faults. Empty text, no
    /// images, zeroed metadata, ERROR status.
    pub fn faulted(number: usize) -> Self {
        Self {
            number,
            text: String::new(),
            images: Vec::new(),
            metadata: PageMetadata::default(),
            status: ValidationStatus::Error,
        }
    }
}

// ── Document-level output ────────────────────────────────────────────────

/// Document-level metadata read from the PDF info dictionary.
///
/// All fields the document does not carry are `None` rather than empty
/// strings; date fields stay in the raw string form pdfium reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    /// True when a password was required to open the document.
    pub encrypted: bool,
}

/// The assembled result of one extraction pass over one document.
///
/// `pages` always holds exactly `page_count` entries, numbered
/// `1..=page_count` in order — faulted pages are included as ERROR
/// placeholders, never dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub pages: Vec<PageContent>,
    pub page_count: usize,
    pub validation: DocumentValidation,
    pub metadata: DocumentMetadata,
}
