//! End-to-end integration tests for pagelift.
//!
//! These tests drive the public API against small PDFs generated in-process,
//! so they need no fixture files — only a pdfium shared library. When pdfium
//! cannot be bound they print SKIP and return, keeping CI green on machines
//! without the engine.
//!
//! Run with:
//!   PAGELIFT_PDFIUM_PATH=/path/to/libpdfium cargo test --test e2e -- --nocapture

use pagelift::{
    extract, extract_from_bytes, inspect, page_count_with_reliability, AssetCache,
    ExtractError, ExtractionConfig, IssueKind, IssueSeverity, ValidationStatus,
};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// True when a pdfium library can be bound in this environment.
///
/// The probe entry point binds pdfium before touching the input, so a
/// nonexistent path distinguishes "no engine" from every other outcome.
async fn pdfium_available() -> bool {
    !matches!(
        page_count_with_reliability("/nonexistent-binding-probe.pdf").await,
        Err(ExtractError::PdfiumBindingFailed(_))
    )
}

macro_rules! skip_unless_pdfium {
    () => {
        if !pdfium_available().await {
            println!("SKIP — pdfium library not available (set PAGELIFT_PDFIUM_PATH)");
            return;
        }
    };
}

/// Serialise a list of PDF object bodies into a complete document with a
/// correct xref table. Object numbers are 1-based in list order.
fn serialize_pdf(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in &offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Build a text-only PDF with one page per entry in `page_texts`. An empty
/// entry produces a page with an empty content stream.
fn text_pdf(page_texts: &[&str]) -> Vec<u8> {
    let page_count = page_texts.len();
    let first_page_obj = 3;

    let mut kids = String::new();
    for i in 0..page_count {
        kids.push_str(&format!("{} 0 R ", first_page_obj + 2 * i));
    }

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!("<< /Type /Pages /Kids [ {kids}] /Count {page_count} >>").into_bytes(),
    );

    for (i, text) in page_texts.iter().enumerate() {
        let content_obj = first_page_obj + 2 * i + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 << /Type /Font /Subtype /Type1 \
                 /BaseFont /Helvetica >> >> >> /Contents {content_obj} 0 R >>"
            )
            .into_bytes(),
        );

        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET")
        };
        objects.push(
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            )
            .into_bytes(),
        );
    }

    serialize_pdf(&objects)
}

/// Build a single-page PDF whose page draws one embedded 2×2 RGB image.
fn image_pdf() -> Vec<u8> {
    let pixels: [u8; 12] = [
        255, 0, 0, 0, 255, 0, // red, green
        0, 0, 255, 255, 255, 0, // blue, yellow
    ];
    let content = "q 100 0 0 100 72 600 cm /Im1 Do Q";

    let mut image_obj = format!(
        "<< /Type /XObject /Subtype /Image /Width 2 /Height 2 \
         /ColorSpace /DeviceRGB /BitsPerComponent 8 /Length {} >>\nstream\n",
        pixels.len()
    )
    .into_bytes();
    image_obj.extend_from_slice(&pixels);
    image_obj.extend_from_slice(b"\nendstream");

    let objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [ 3 0 R ] /Count 1 >>".to_vec(),
        b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
          /Resources << /XObject << /Im1 5 0 R >> >> /Contents 4 0 R >>"
            .to_vec(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        )
        .into_bytes(),
        image_obj,
    ];

    serialize_pdf(&objects)
}

fn test_cache(max_items: usize) -> (tempfile::TempDir, Arc<AssetCache>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = Arc::new(AssetCache::new(dir.path().join("assets"), max_items).expect("cache"));
    (dir, cache)
}

// ── Fatal-path tests (no pdfium needed) ──────────────────────────────────────

#[tokio::test]
async fn extract_nonexistent_file_is_err() {
    let (_dir, cache) = test_cache(4);
    let result = extract(
        "/definitely/not/a/real/file.pdf",
        &ExtractionConfig::default(),
        &cache,
    )
    .await;
    assert!(matches!(result, Err(ExtractError::FileNotFound { .. })));
}

#[tokio::test]
async fn inspect_nonexistent_is_err() {
    let result = inspect("/definitely/not/a/real/file.pdf").await;
    assert!(result.is_err(), "inspect() should return Err for a missing file");
}

#[tokio::test]
async fn extract_from_bytes_rejects_garbage() {
    let (_dir, cache) = test_cache(4);
    let result =
        extract_from_bytes(b"<html>nope</html>", &ExtractionConfig::default(), &cache).await;
    assert!(matches!(result, Err(ExtractError::NotAPdf { .. })));
}

// ── Full-pipeline tests (need pdfium) ────────────────────────────────────────

#[tokio::test]
async fn extract_three_text_pages() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    let pdf = text_pdf(&[
        "The first page of the sample",
        "The second page of the sample",
        "The third page of the sample",
    ]);
    let config = ExtractionConfig::builder().token("sample").build().unwrap();
    let result = extract_from_bytes(&pdf, &config, &cache)
        .await
        .expect("extraction should succeed");

    // Exactly page_count entries, numbered contiguously from 1.
    assert_eq!(result.page_count, 3);
    assert_eq!(result.pages.len(), result.page_count);
    for (i, page) in result.pages.iter().enumerate() {
        assert_eq!(page.number, i + 1);
        assert_eq!(page.status, ValidationStatus::Valid);
        assert!(page.has_content());
        assert!(page.metadata.word_count > 0);
        assert!(page.metadata.reading_time_secs > 0.0);
    }

    assert!(result.validation.is_valid);
    assert_eq!(result.validation.total_pages, 3);
    assert_eq!(result.validation.validated_pages, 3);
    assert!(result.validation.issues.is_empty());

    assert!(
        result.pages[1].text.contains("second page"),
        "reading-order text should survive extraction, got: {:?}",
        result.pages[1].text
    );
}

#[tokio::test]
async fn empty_page_is_a_missing_warning_but_document_stays_valid() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    let pdf = text_pdf(&["Some real content", "", "More real content"]);
    let result = extract_from_bytes(&pdf, &ExtractionConfig::default(), &cache)
        .await
        .expect("extraction should succeed");

    assert_eq!(result.pages.len(), 3);
    let blank = &result.pages[1];
    assert_eq!(blank.status, ValidationStatus::Warning);
    assert!(!blank.has_content());
    assert_eq!(blank.metadata.word_count, 0);
    assert_eq!(blank.metadata.reading_time_secs, 0.0);

    // A WARNING page still counts toward validated_pages, so the document
    // as a whole remains valid.
    assert!(result.validation.is_valid);
    assert_eq!(result.validation.validated_pages, 3);
    assert_eq!(result.validation.issues.len(), 1);
    let issue = &result.validation.issues[0];
    assert_eq!(issue.page, 2);
    assert_eq!(issue.kind, IssueKind::Missing);
    assert_eq!(issue.severity, IssueSeverity::Warning);
}

#[tokio::test]
async fn skipping_validation_synthesizes_a_trivially_valid_summary() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    // The blank page would produce a warning; with validate(false) the
    // summary must be trivially valid while per-page statuses still apply.
    let pdf = text_pdf(&["Content", ""]);
    let config = ExtractionConfig::builder().validate(false).build().unwrap();
    let result = extract_from_bytes(&pdf, &config, &cache)
        .await
        .expect("extraction should succeed");

    assert!(result.validation.is_valid);
    assert_eq!(result.validation.validated_pages, result.validation.total_pages);
    assert!(result.validation.issues.is_empty());
    assert_eq!(result.pages[1].status, ValidationStatus::Warning);
}

#[tokio::test]
async fn embedded_image_lands_in_the_asset_cache() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    let pdf = image_pdf();
    let config = ExtractionConfig::builder().token("imgdoc").build().unwrap();
    let result = extract_from_bytes(&pdf, &config, &cache)
        .await
        .expect("extraction should succeed");

    assert_eq!(result.pages.len(), 1);
    let page = &result.pages[0];
    assert_eq!(page.images.len(), 1, "one embedded image expected");
    assert!(page.has_content(), "an image alone is content");
    assert!(page.metadata.has_images);

    let image = &page.images[0];
    assert_eq!(image.id, "imgdoc_p1_0.png");
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.width, Some(2));
    assert_eq!(image.height, Some(2));
    assert!(image.path.exists(), "backing file must exist");

    // The id resolves through the cache until evicted.
    let entry = cache.get(&image.id).expect("asset resolves via get()");
    assert_eq!(entry.path, image.path);
    assert_eq!(entry.content_type, "image/png");
}

#[tokio::test]
async fn inspect_and_probe_report_page_count() {
    skip_unless_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    std::fs::write(&path, text_pdf(&["one", "two", "three", "four"])).unwrap();
    let path_str = path.to_str().unwrap();

    let meta = inspect(path_str).await.expect("inspect should succeed");
    assert_eq!(meta.page_count, 4);
    assert!(!meta.encrypted);

    let (count, reliable) = page_count_with_reliability(path_str)
        .await
        .expect("probe should succeed");
    assert_eq!(count, 4);
    assert!(reliable, "first and last pages load, so the count is reliable");
}

#[tokio::test]
async fn probe_on_missing_file_reports_unreliable() {
    skip_unless_pdfium!();

    let (count, reliable) = page_count_with_reliability("/no/such/file.pdf")
        .await
        .expect("input problems are a probe result, not an error");
    assert_eq!(count, 0);
    assert!(!reliable);
}

#[tokio::test]
async fn result_round_trips_through_json() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    let pdf = text_pdf(&["Serialisable content"]);
    let result = extract_from_bytes(&pdf, &ExtractionConfig::default(), &cache)
        .await
        .expect("extraction should succeed");

    let json = serde_json::to_string_pretty(&result).expect("result must serialise");
    let back: pagelift::ExtractionResult =
        serde_json::from_str(&json).expect("JSON must deserialise back");
    assert_eq!(back.page_count, result.page_count);
    assert_eq!(back.pages.len(), result.pages.len());
    assert_eq!(back.validation.is_valid, result.validation.is_valid);
}

#[tokio::test]
async fn repeated_extraction_yields_identical_asset_ids() {
    skip_unless_pdfium!();
    let (_dir, cache) = test_cache(16);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stable.pdf");
    std::fs::write(&path, image_pdf()).unwrap();
    let path_str = path.to_str().unwrap();

    // No explicit token: the default derives from the path, so two runs over
    // the same file must produce the same ids.
    let config = ExtractionConfig::default();
    let first = extract(path_str, &config, &cache).await.unwrap();
    let second = extract(path_str, &config, &cache).await.unwrap();

    let first_ids: Vec<_> = first.pages[0].images.iter().map(|i| i.id.clone()).collect();
    let second_ids: Vec<_> = second.pages[0].images.iter().map(|i| i.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn progress_events_fire_per_page_in_order() {
    skip_unless_pdfium!();

    use pagelift::ExtractionProgress;
    use std::sync::Mutex;

    struct Recorder {
        pages: Mutex<Vec<usize>>,
        totals: Mutex<Vec<usize>>,
    }

    impl ExtractionProgress for Recorder {
        fn on_extraction_start(&self, total_pages: usize) {
            self.totals.lock().unwrap().push(total_pages);
        }
        fn on_page_extracted(&self, page_num: usize, _total: usize, _text_len: usize) {
            self.pages.lock().unwrap().push(page_num);
        }
        fn on_extraction_complete(&self, _total: usize, faulted: usize) {
            assert_eq!(faulted, 0);
        }
    }

    let recorder = Arc::new(Recorder {
        pages: Mutex::new(Vec::new()),
        totals: Mutex::new(Vec::new()),
    });

    let (_dir, cache) = test_cache(16);
    let pdf = text_pdf(&["a", "b", "c"]);
    let config = ExtractionConfig::builder()
        .progress(Arc::clone(&recorder) as Arc<dyn ExtractionProgress>)
        .build()
        .unwrap();

    extract_from_bytes(&pdf, &config, &cache).await.unwrap();

    assert_eq!(*recorder.totals.lock().unwrap(), vec![3]);
    assert_eq!(*recorder.pages.lock().unwrap(), vec![1, 2, 3]);
}
