//! Error types for the pdf2grid library.
//!
//! One enum covers the whole failure taxonomy because every failure here is
//! fatal to the run: a batch that cannot be extracted means the caller would
//! otherwise receive a silently incomplete dataset, so partial results are
//! never returned. The orchestrator wraps any per-batch cause in
//! [`Pdf2GridError::Batch`], which names the exact 1-based page range that
//! failed so the user knows which part of the document to inspect.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2grid library.
#[derive(Debug, Error)]
pub enum Pdf2GridError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No API key available from config or environment.
    #[error("No API key configured.\nSet GEMINI_API_KEY (or GOOGLE_AI_API_KEY), or pass one via ExtractionConfig::builder().api_key(..).")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Document errors ───────────────────────────────────────────────────
    /// Input bytes could not be parsed as a PDF document.
    #[error("Failed to load PDF document: {detail}\nThe input is not a valid PDF, or is corrupt.")]
    DocumentLoad { detail: String },

    // ── Service errors ────────────────────────────────────────────────────
    /// The extraction service call failed or returned no usable text.
    #[error("Extraction service error: {detail}")]
    Service { detail: String },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// The service response could not be decoded as grid data, even after
    /// truncation repair.
    #[error("Failed to parse extraction response{}: {detail}", truncated_hint(.truncated))]
    Parse { detail: String, truncated: bool },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// A batch failed; carries the 1-based page range and the underlying
    /// cause. The whole run is aborted — no partial data is returned.
    #[error("Extraction failed for pages {first_page}-{last_page}: {source}")]
    Batch {
        first_page: usize,
        last_page: usize,
        #[source]
        source: Box<Pdf2GridError>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input PDF file.
    #[error("Failed to read PDF file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn truncated_hint(truncated: &bool) -> &'static str {
    if *truncated {
        " (output appears truncated)"
    } else {
        ""
    }
}

impl Pdf2GridError {
    /// Wrap an error with the 1-based page range of the batch it occurred in.
    pub(crate) fn for_batch(self, first_page: usize, last_page: usize) -> Self {
        Pdf2GridError::Batch {
            first_page,
            last_page,
            source: Box::new(self),
        }
    }
}
