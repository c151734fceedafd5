//! Input resolution: validate a user-supplied path before opening it.
//!
//! pdfium's own error for a non-PDF file is an opaque format error, so we
//! check existence, readability, and the `%PDF` magic bytes up front and
//! return a meaningful [`ExtractError`] instead of a backend crash. Files
//! shorter than four bytes cannot be PDFs and fail the same check.

use crate::error::ExtractError;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_input(path_str: &str) -> Result<PathBuf, ExtractError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    // Check read permission by attempting to open.
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => return Err(ExtractError::NotAPdf { path, magic }),
                Err(_) => {
                    // Too short to carry the header.
                    return Err(ExtractError::NotAPdf {
                        path,
                        magic: [0; 4],
                    });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("resolved PDF input: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/a/real/file.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a....").unwrap();
        let err = resolve_input(f.path().to_str().unwrap()).unwrap_err();
        match err {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"GIF8"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        let err = resolve_input(f.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n%rest-of-document").unwrap();
        let path = resolve_input(f.path().to_str().unwrap()).unwrap();
        assert_eq!(path, f.path());
    }
}
