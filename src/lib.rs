//! # pdf2grid
//!
//! Extract tabular data from PDF documents using Vision Language Models.
//!
//! ## Why this crate?
//!
//! Geometric table extractors (ruling-line detection, text clustering) fall
//! apart on scanned documents, merged cells, and tables whose structure is
//! visual rather than encoded. Instead this crate sends small page batches of
//! the original PDF to a vision model and asks for each page's table as a 2D
//! string grid, then reconciles the per-batch answers into one page-indexed
//! dataset.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Split     cut the document into 3-page sub-documents (lopdf)
//!  ├─ 2. Service   one vision API call per batch, JSON output requested
//!  ├─ 3. Parse     decode + repair fenced/commented/truncated payloads
//!  ├─ 4. Renumber  batch-local page keys → document-global page keys
//!  └─ 5. Merge     aggregate map, all-or-nothing on batch failure
//! ```
//!
//! Batches run strictly sequentially; one failed batch aborts the whole run
//! with an error naming the failing 1-based page range, and no partial data
//! is ever returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2grid::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key auto-detected from GEMINI_API_KEY / GOOGLE_AI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let bytes = std::fs::read("tables.pdf")?;
//!     let output = extract(&bytes, &config).await?;
//!     for key in pdf2grid::sorted_page_keys(&output.pages) {
//!         println!("page {}: {} rows", key, output.pages[key].len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2grid` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2grid = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_BATCH_SIZE};
pub use error::Pdf2GridError;
pub use export::{write_csv, ExportMode};
pub use extract::{extract, extract_file, extract_sync, page_count};
pub use output::{sorted_page_keys, ExtractionOutput, ExtractionStats, PageDataMap, PageGrid};
pub use pipeline::service::VisionService;
pub use progress::{NoopProgressSink, Progress, ProgressSink};
