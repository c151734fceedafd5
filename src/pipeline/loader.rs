//! Document loading: bind pdfium, open documents, read metadata.
//!
//! ## Binding
//!
//! The pdfium shared library is resolved once per [`Loader`]: an explicit
//! `PAGELIFT_PDFIUM_PATH` override (a library file or the directory holding
//! it) wins, then the system loader path. Binding failure is fatal — nothing
//! downstream can run without the engine.
//!
//! ## Open is the only fatal stage
//!
//! A document that cannot be parsed at all aborts the extraction with a
//! fatal [`ExtractError`]; every later failure is scoped to a page or an
//! asset. Open errors are mapped onto the password/corruption taxonomy so
//! callers can distinguish "needs a password" from "broken file".

use crate::error::ExtractError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Owns the pdfium binding for the lifetime of one pipeline run.
///
/// Documents opened through a `Loader` borrow it, so the engine outlives
/// every open document and each document closes when it drops.
pub struct Loader {
    pdfium: Pdfium,
}

impl Loader {
    /// Bind to a pdfium library: `PAGELIFT_PDFIUM_PATH` override first,
    /// then the system library.
    pub fn new() -> Result<Self, ExtractError> {
        let bindings = bind_pdfium()?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Open the backing document. This is the pipeline's single fatal
    /// failure mode.
    pub fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<PdfDocument<'a>, ExtractError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        ExtractError::WrongPassword {
                            path: path.to_path_buf(),
                        }
                    } else {
                        ExtractError::PasswordRequired {
                            path: path.to_path_buf(),
                        }
                    }
                } else {
                    ExtractError::CorruptPdf {
                        path: path.to_path_buf(),
                        detail: err_str,
                    }
                }
            })?;

        info!(
            "opened '{}': {} pages",
            path.display(),
            document.pages().len()
        );
        Ok(document)
    }

    /// Page count plus a cheap reliability probe.
    ///
    /// Attempts to load the first and, when more than one page exists, the
    /// last page. Any failure — including failure to open the document at
    /// all — reports `reliable = false` so callers can decide whether a full
    /// extraction is worth committing resources to. Never errors.
    pub fn page_count_with_reliability(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> (usize, bool) {
        let document = match self.open(path, password) {
            Ok(doc) => doc,
            Err(err) => {
                debug!("reliability probe could not open '{}': {}", path.display(), err);
                return (0, false);
            }
        };

        let pages = document.pages();
        let page_count = pages.len() as usize;
        if page_count == 0 {
            return (0, false);
        }

        let mut reliable = pages.get(0).is_ok();
        if reliable && page_count > 1 {
            reliable = pages.get((page_count - 1) as u16).is_ok();
        }
        (page_count, reliable)
    }
}

/// Read the document-level metadata map, defaulting absent fields to `None`
/// rather than failing. `encrypted` records whether a password was needed to
/// open the document (pdfium does not expose the flag afterwards).
pub fn document_metadata(document: &PdfDocument<'_>, encrypted: bool) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        keywords: get_meta(PdfDocumentMetadataTagType::Keywords),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        encrypted,
    }
}

/// Resolve a pdfium binding: env override → system library.
fn bind_pdfium() -> Result<Box<dyn PdfiumLibraryBindings>, ExtractError> {
    if let Some(override_path) = std::env::var_os("PAGELIFT_PDFIUM_PATH") {
        let pb = PathBuf::from(override_path);
        let lib_path = if pb.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&pb)
        } else {
            pb
        };
        return Pdfium::bind_to_library(&lib_path)
            .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")));
    }

    Pdfium::bind_to_system_library()
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))
}
