//! Per-page extraction: text in reading order, embedded images, derived
//! metadata.
//!
//! ## Fault isolation
//!
//! One unreadable page must never prevent collection of the rest, and one
//! broken image must never fail its page. The containment is expressed as
//! values, not catch blocks: [`extract_page`] returns a
//! [`PageFault`] the orchestrator turns into an ERROR placeholder page, and
//! each image is lifted through its own `Result` that is logged and skipped
//! on failure.
//!
//! ## Why PNG for stored assets?
//!
//! pdfium hands embedded images back as decoded bitmaps, not as the original
//! byte streams. Re-encoding losslessly keeps the cache self-describing —
//! every backing file is a well-formed PNG regardless of what filter the
//! source document used.

use crate::assets::AssetCache;
use crate::config::ExtractionConfig;
use crate::error::{AssetError, PageFault};
use crate::output::{PageContent, PageImage, PageMetadata};
use crate::pipeline::validate;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, warn};

/// Extract one page: validate, pull text and images, compute metadata.
///
/// Returns a [`PageFault`] only for hard faults (the page cannot be loaded
/// or its text cannot be read at all); encoding and emptiness findings are
/// WARNING statuses on an otherwise complete page.
pub fn extract_page(
    document: &PdfDocument<'_>,
    index: usize,
    token: &str,
    config: &ExtractionConfig,
    assets: &AssetCache,
) -> Result<PageContent, PageFault> {
    let page_number = index + 1;

    let pages = document.pages();
    let page = pages.get(index as u16).map_err(|e| PageFault::LoadFailed {
        page: page_number,
        detail: format!("{e:?}"),
    })?;

    let text = page
        .text()
        .map_err(|e| PageFault::TextFailed {
            page: page_number,
            detail: format!("{e:?}"),
        })?
        .all();
    let text = text.trim().to_string();

    // Validator runs against the same loaded page and text the extractor
    // uses, so the status reflects exactly what ends up in the result.
    let check = validate::check_page(&page, page_number, &text, config);

    let images = extract_images(&page, page_number, token, assets);
    let metadata = PageMetadata::compute(&text, !images.is_empty());

    debug!(
        "page {}: {} words, {} images, status {:?}",
        page_number, metadata.word_count, images.len(), check.status
    );

    Ok(PageContent {
        number: page_number,
        text,
        images,
        metadata,
        status: check.status,
    })
}

/// Walk the page's image objects in order, lifting each into the asset
/// cache. A failed image is logged and skipped; the loop continues.
fn extract_images(
    page: &PdfPage<'_>,
    page_number: usize,
    token: &str,
    assets: &AssetCache,
) -> Vec<PageImage> {
    let mut images = Vec::new();
    let mut index = 0usize;

    for object in page.objects().iter() {
        if object.object_type() != PdfPageObjectType::Image {
            continue;
        }
        match lift_image(&object, page_number, index, token, assets) {
            Ok(image) => images.push(image),
            Err(err) => warn!("skipping asset: {}", err),
        }
        index += 1;
    }

    images
}

/// Decode one image object, re-encode it as PNG, and register it with the
/// asset cache under its deterministic id.
fn lift_image(
    object: &PdfPageObject<'_>,
    page_number: usize,
    index: usize,
    token: &str,
    assets: &AssetCache,
) -> Result<PageImage, AssetError> {
    let image_object = object.as_image_object().ok_or_else(|| AssetError::DecodeFailed {
        page: page_number,
        index,
        detail: "object is not an image".into(),
    })?;

    let bitmap = image_object
        .get_raw_image()
        .map_err(|e| AssetError::DecodeFailed {
            page: page_number,
            index,
            detail: format!("{e:?}"),
        })?;

    let bytes = encode_png(&bitmap).map_err(|source| AssetError::EncodeFailed {
        page: page_number,
        index,
        source,
    })?;

    let id = asset_id(token, page_number, index, "png");
    let path = assets.register(&id, &bytes, "png", "image/png")?;
    debug!(
        "page {}: stored image {} ({}x{}, {} bytes)",
        page_number,
        id,
        bitmap.width(),
        bitmap.height(),
        bytes.len()
    );

    Ok(PageImage {
        id,
        path,
        width: Some(bitmap.width()),
        height: Some(bitmap.height()),
        content_type: "image/png".to_string(),
    })
}

/// Deterministic asset id: `{token}_p{page}_{index}.{ext}`.
///
/// Pages are processed strictly in ascending order and images in on-page
/// order, so ids are stable across repeated extractions of the same
/// document with the same token.
fn asset_id(token: &str, page_number: usize, index: usize, extension: &str) -> String {
    format!("{token}_p{page_number}_{index}.{extension}")
}

/// Encode a decoded bitmap as PNG bytes for storage.
fn encode_png(bitmap: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn asset_ids_are_deterministic_and_positional() {
        assert_eq!(asset_id("abc123", 4, 0, "png"), "abc123_p4_0.png");
        assert_eq!(asset_id("abc123", 4, 1, "png"), "abc123_p4_1.png");
        assert_eq!(asset_id("other", 12, 3, "png"), "other_p12_3.png");
    }

    #[test]
    fn encode_png_produces_decodable_bytes() {
        let bitmap =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 255])));
        let bytes = encode_png(&bitmap).expect("encode should succeed");
        assert!(!bytes.is_empty());
        // PNG signature
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let back = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!(back.width(), 8);
        assert_eq!(back.height(), 8);
    }

    #[test]
    fn encoded_bitmap_round_trips_through_the_cache() {
        let dir = tempdir().unwrap();
        let assets = AssetCache::new(dir.path().join("assets"), 10).unwrap();

        let bitmap =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));
        let bytes = encode_png(&bitmap).unwrap();
        let id = asset_id("tok", 1, 0, "png");
        let path = assets.register(&id, &bytes, "png", "image/png").unwrap();

        let entry = assets.get(&id).expect("asset resolves");
        assert_eq!(entry.path, path);
        let stored = std::fs::read(&entry.path).unwrap();
        assert_eq!(stored, bytes);
    }
}
