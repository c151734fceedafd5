//! Page-level structural checks and document-level validation.
//!
//! A page gets exactly one status and at most one issue per pass. Checks run
//! in a fixed order and the first non-VALID outcome wins:
//!
//! 1. a low-resolution render probe — any failure classifies the page
//!    ERROR/corrupt;
//! 2. a replacement-character (`U+FFFD`) scan of the extracted text —
//!    WARNING/encoding;
//! 3. an emptiness check (no text, no image objects) — WARNING/missing;
//! 4. otherwise VALID.
//!
//! The render probe is deliberately tiny (see
//! [`crate::config::ExtractionConfig::probe_width`]): it only has to answer
//! "can pdfium rasterise this page at all", which catches broken content
//! streams long before a full-size render would.

use crate::config::ExtractionConfig;
use crate::output::{
    DocumentValidation, IssueKind, IssueSeverity, ValidationIssue, ValidationStatus,
};
use pdfium_render::prelude::*;
use tracing::debug;

/// Outcome of validating one page: a terminal status and at most one issue.
pub struct PageCheck {
    pub status: ValidationStatus,
    pub issue: Option<ValidationIssue>,
}

impl PageCheck {
    fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            issue: None,
        }
    }
}

/// Validate a single loaded page against its extracted (trimmed) text.
pub fn check_page(
    page: &PdfPage<'_>,
    page_number: usize,
    text: &str,
    config: &ExtractionConfig,
) -> PageCheck {
    // Corruption probe: if the page cannot render at thumbnail size it will
    // not survive any downstream use either.
    let probe = PdfRenderConfig::new().set_target_width(config.probe_width as i32);
    if let Err(e) = page.render_with_config(&probe) {
        return PageCheck {
            status: ValidationStatus::Error,
            issue: Some(ValidationIssue {
                page: page_number,
                kind: IssueKind::Corrupt,
                message: format!("Page {page_number} validation failed: {e:?}"),
                severity: IssueSeverity::Error,
            }),
        };
    }

    classify_content(page_number, text, page_has_images(page))
}

/// The text-level checks, split out so they are testable without pdfium.
fn classify_content(page_number: usize, text: &str, has_images: bool) -> PageCheck {
    if text.contains('\u{FFFD}') {
        return PageCheck {
            status: ValidationStatus::Warning,
            issue: Some(ValidationIssue {
                page: page_number,
                kind: IssueKind::Encoding,
                message: format!("Page {page_number} may have encoding issues"),
                severity: IssueSeverity::Warning,
            }),
        };
    }

    if text.trim().is_empty() && !has_images {
        return PageCheck {
            status: ValidationStatus::Warning,
            issue: Some(ValidationIssue {
                page: page_number,
                kind: IssueKind::Missing,
                message: format!("Page {page_number} appears to be empty"),
                severity: IssueSeverity::Warning,
            }),
        };
    }

    PageCheck::valid()
}

/// Whether the page carries at least one embedded image object.
pub fn page_has_images(page: &PdfPage<'_>) -> bool {
    page.objects()
        .iter()
        .any(|object| object.object_type() == PdfPageObjectType::Image)
}

/// Validate the entire document.
///
/// Every page is checked; a page whose load (or text extraction) fails is
/// recorded as an ERROR issue without aborting validation of the remaining
/// pages. `validated_pages` counts every page not classified ERROR, so pages
/// with only WARNING-level issues still count.
pub fn validate_document(
    document: &PdfDocument<'_>,
    config: &ExtractionConfig,
) -> DocumentValidation {
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let mut issues: Vec<ValidationIssue> = Vec::new();
    let mut validated_pages = 0usize;

    for index in 0..total_pages {
        let page_number = index + 1;

        let loaded = pages
            .get(index as u16)
            .map_err(|e| format!("{e:?}"))
            .and_then(|page| {
                let text = page.text().map_err(|e| format!("{e:?}"))?.all();
                Ok((page, text))
            });

        match loaded {
            Ok((page, text)) => {
                let check = check_page(&page, page_number, text.trim(), config);
                if let Some(issue) = check.issue {
                    debug!("page {}: {:?}", page_number, issue.kind);
                    issues.push(issue);
                }
                if check.status != ValidationStatus::Error {
                    validated_pages += 1;
                }
            }
            Err(detail) => {
                issues.push(ValidationIssue {
                    page: page_number,
                    kind: IssueKind::Corrupt,
                    message: format!("Failed to load page {page_number}: {detail}"),
                    severity: IssueSeverity::Error,
                });
            }
        }
    }

    DocumentValidation::summarize(total_pages, validated_pages, issues)
}
