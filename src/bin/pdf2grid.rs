//! CLI binary for pdf2grid.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, renders batch progress, and writes CSV output.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2grid::{
    extract_file, sorted_page_keys, write_csv, ExportMode, ExtractionConfig, ProgressSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "pdf2grid",
    version,
    about = "Extract tabular data from PDF documents using Vision Language Models",
    long_about = "Extracts every page's table content as a 2D grid by sending small page \
                  batches to a vision model, and writes the result as CSV.\n\n\
                  The API key is read from --api-key, GEMINI_API_KEY, or GOOGLE_AI_API_KEY."
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Output CSV file (single sheet) or directory (with --per-page).
    /// Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write one CSV file per page into the output directory instead of one
    /// concatenated sheet.
    #[arg(long)]
    per_page: bool,

    /// Model identifier.
    #[arg(long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Pages per batch. Larger batches risk truncated responses.
    #[arg(long, default_value_t = pdf2grid::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// API key (falls back to GEMINI_API_KEY / GOOGLE_AI_API_KEY).
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL override (proxies, self-hosted gateways).
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-batch API timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Verbose logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the progress display.
    #[arg(short, long)]
    quiet: bool,
}

/// Progress display: a spinner carrying the orchestrator's status strings.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ProgressSink for CliProgress {
    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("pdf2grid=debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut builder = ExtractionConfig::builder()
        .model(&cli.model)
        .batch_size(cli.batch_size)
        .api_timeout_secs(cli.timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = cli.endpoint {
        builder = builder.endpoint(url);
    }

    let progress = (!cli.quiet).then(CliProgress::new);
    if let Some(ref p) = progress {
        builder = builder.progress(Arc::clone(p) as Arc<dyn ProgressSink>);
    }

    let config = builder.build()?;

    let output = extract_file(&cli.input, &config)
        .await
        .with_context(|| format!("extracting '{}'", cli.input.display()))?;

    if let Some(ref p) = progress {
        p.bar.finish_and_clear();
    }

    let mode = if cli.per_page {
        ExportMode::SheetPerPage
    } else {
        ExportMode::SingleSheet
    };

    match cli.output {
        Some(ref path) => {
            write_csv(&output.pages, path, mode)?;
            eprintln!(
                "{} {}",
                green("✓"),
                bold(&format!(
                    "Extracted {} pages ({} batches) → {}",
                    output.stats.extracted_pages,
                    output.stats.batches,
                    path.display()
                ))
            );
        }
        None => {
            // No output path: single-sheet CSV to stdout regardless of mode.
            print!("{}", pdf2grid::export::single_sheet_csv(&output.pages)?);
            eprintln!(
                "{} {}",
                green("✓"),
                dim(&format!(
                    "{} pages in {:.1}s (pages: {})",
                    output.stats.extracted_pages,
                    output.stats.total_duration_ms as f64 / 1000.0,
                    sorted_page_keys(&output.pages).join(", ")
                ))
            );
        }
    }

    Ok(())
}
