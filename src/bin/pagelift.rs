//! CLI binary for pagelift.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, wires up the process-wide asset cache, and prints
//! results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pagelift::{
    extract, inspect, page_count_with_reliability, AssetCache, ExtractionConfig,
    ExtractionProgress,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus per-page error lines.
struct CliProgress {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgress {
    /// Create a callback whose bar length is set by `on_extraction_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgress for CliProgress {
    fn on_extraction_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_extracted(&self, page_num: usize, _total_pages: usize, _text_len: usize) {
        self.bar.set_message(format!("page {page_num}"));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, faulted_count: usize) {
        self.bar.finish_and_clear();

        if faulted_count == 0 {
            eprintln!(
                "{} {} pages extracted",
                green("✔"),
                bold(&total_pages.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages extracted  ({} faulted)",
                cyan("⚠"),
                bold(&(total_pages - faulted_count).to_string()),
                total_pages,
                red(&faulted_count.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract and print a per-page summary
  pagelift document.pdf

  # Structured JSON (pages, validation, metadata)
  pagelift --json document.pdf > result.json

  # Skip the validation pass
  pagelift --no-validate document.pdf

  # Inspect document metadata only
  pagelift --inspect-only document.pdf

  # Feasibility probe: page count + reliability flag
  pagelift --probe-only large-scan.pdf

  # Namespace extracted assets under a caller-chosen token
  pagelift --token report-2024 --asset-dir /var/cache/pagelift document.pdf

ENVIRONMENT VARIABLES:
  PAGELIFT_ASSET_DIR     Asset cache directory (default: $TMPDIR/pagelift_assets)
  PAGELIFT_PDFIUM_PATH   Path to libpdfium (file or directory) — skips the
                         system library lookup
"#;

/// Extract per-page text, images, and validation from PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "pagelift",
    version,
    about = "Extract per-page text, images, and validation from PDF documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: String,

    /// Namespace token for asset ids (default: hash of the path).
    #[arg(long, env = "PAGELIFT_TOKEN")]
    token: Option<String>,

    /// Skip the document validation pass.
    #[arg(long)]
    no_validate: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PAGELIFT_PASSWORD")]
    password: Option<String>,

    /// Asset cache directory.
    #[arg(long, env = "PAGELIFT_ASSET_DIR")]
    asset_dir: Option<PathBuf>,

    /// Maximum number of assets resident in the cache.
    #[arg(long, env = "PAGELIFT_MAX_ASSETS", default_value_t = AssetCache::DEFAULT_MAX_ITEMS)]
    max_assets: usize,

    /// Number of pages to preview in the summary output.
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Output the full ExtractionResult as JSON instead of a summary.
    #[arg(long, env = "PAGELIFT_JSON")]
    json: bool,

    /// Print document metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Print page count + reliability probe only, no extraction.
    #[arg(long)]
    probe_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PAGELIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGELIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGELIFT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides the feedback that matters. Verbose wins over everything.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            if let Some(ref k) = meta.keywords {
                println!("Keywords:     {}", k);
            }
            println!("Pages:        {}", meta.page_count);
            println!("Encrypted:    {}", meta.encrypted);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Probe-only mode ──────────────────────────────────────────────────
    if cli.probe_only {
        let (count, reliable) = page_count_with_reliability(&cli.input)
            .await
            .context("Failed to probe PDF")?;
        if cli.json {
            println!("{{\"page_count\": {count}, \"reliable\": {reliable}}}");
        } else {
            println!("Pages:     {count}");
            println!("Reliable:  {reliable}");
        }
        return Ok(());
    }

    // ── Build cache and config ───────────────────────────────────────────
    let asset_dir = cli.asset_dir.clone().unwrap_or_else(AssetCache::default_dir);
    let assets = Arc::new(
        AssetCache::new(asset_dir, cli.max_assets).context("Failed to create asset cache")?,
    );

    let mut builder = ExtractionConfig::builder().validate(!cli.no_validate);
    if let Some(ref token) = cli.token {
        builder = builder.token(token.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if show_progress {
        builder = builder.progress(CliProgress::new_dynamic() as Arc<dyn ExtractionProgress>);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let result = extract(&cli.input, &config, &assets)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
        return Ok(());
    }

    print_summary(&cli, &result);
    Ok(())
}

/// Human-readable extraction summary: per-page preview, content gaps,
/// validation issues.
fn print_summary(cli: &Cli, result: &pagelift::ExtractionResult) {
    println!("PDF: {}", cli.input);
    println!("Total pages detected: {}", result.page_count);
    println!(
        "Validation: {} ({}/{} pages validated, {} issues)",
        if result.validation.is_valid {
            green("valid")
        } else {
            red("invalid")
        },
        result.validation.validated_pages,
        result.validation.total_pages,
        result.validation.issues.len(),
    );

    let preview = cli.preview.min(result.pages.len());
    if preview > 0 {
        println!("Preview of first {preview} pages (text length / image count):");
        for page in result.pages.iter().take(preview) {
            println!(
                " - Page {:>3}: text_len={:<6} images={:<2} has_content={}",
                page.number,
                page.text.len(),
                page.images.len(),
                page.has_content(),
            );
        }
    }

    let missing: Vec<usize> = result
        .pages
        .iter()
        .filter(|p| !p.has_content())
        .map(|p| p.number)
        .collect();
    if missing.is_empty() {
        println!("All pages have some content captured.");
    } else {
        println!("Pages without textual or image content: {}", missing.len());
        let sample: Vec<String> = missing.iter().take(10).map(|n| n.to_string()).collect();
        println!("Sample: {}", sample.join(", "));
    }

    if !result.validation.issues.is_empty() {
        println!("Issues:");
        for issue in &result.validation.issues {
            println!(
                "  {} page {:>3} [{:?}/{:?}] {}",
                dim("•"),
                issue.page,
                issue.kind,
                issue.severity,
                issue.message
            );
        }
    }
}
