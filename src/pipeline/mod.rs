//! Pipeline stages for page-level PDF extraction.
//!
//! Each submodule implements exactly one stage. Keeping stages separate makes
//! each independently testable and lets us swap implementations (e.g. switch
//! the PDF backend) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ loader ──▶ validate ──▶ page ──▶ assets
//! (path)    (pdfium)   (probe)     (text+    (LRU
//!                                   images)   cache)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path and check the PDF
//!    magic bytes before pdfium ever sees the file
//! 2. [`loader`]   — bind pdfium, open the document, expose page count,
//!    metadata, and the cheap reliability probe
//! 3. [`validate`] — per-page structural checks and the document-level
//!    validation summary
//! 4. [`page`]     — per-page text and image extraction; discovered assets
//!    are handed to the [`crate::assets::AssetCache`]

pub mod input;
pub mod loader;
pub mod page;
pub mod validate;
