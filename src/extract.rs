//! Extraction entry points: drive the batch pipeline over a whole document.
//!
//! ## Why strictly sequential batches?
//!
//! Windows are processed one at a time, never concurrently: the service may
//! rate-limit per caller, sequential processing gives clean one-line progress
//! reporting per window, and merging into the aggregate map then needs no
//! synchronisation at all.
//!
//! ## Why all-or-nothing?
//!
//! A partial result presented silently is worse than a failure: a user who
//! sees a populated grid believes the extraction is complete and misses the
//! absent pages. Any batch failure therefore aborts the run; the error names
//! the exact 1-based page range that failed, and the partially built map is
//! discarded, never returned.

use crate::config::ExtractionConfig;
use crate::error::Pdf2GridError;
use crate::output::{ExtractionOutput, ExtractionStats, PageDataMap};
use crate::pages::{to_global_key, windows, BatchWindow};
use crate::pipeline::service::{GeminiService, VisionService};
use crate::pipeline::{parse, split};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract tables from an in-memory PDF.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`Pdf2GridError::MissingApiKey`] — no credential and no injected service
/// - [`Pdf2GridError::DocumentLoad`] — the bytes are not a valid PDF
/// - [`Pdf2GridError::Batch`] — a batch failed; carries the 1-based page
///   range and the cause. No partial data is returned.
pub async fn extract(
    pdf_bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2GridError> {
    let total_start = Instant::now();

    // ── Step 1: Resolve the extraction service ───────────────────────────
    let service = resolve_service(config)?;

    // ── Step 2: Load the document ────────────────────────────────────────
    let document = split::SourceDocument::from_bytes(pdf_bytes)?;
    let total_pages = document.page_count();
    info!("PDF has {} pages", total_pages);

    // ── Step 3: Partition into batch windows ─────────────────────────────
    let batch_windows = windows(total_pages, config.batch_size);
    debug!(
        "Processing {} windows of up to {} pages",
        batch_windows.len(),
        config.batch_size
    );

    // ── Step 4: Drive batches sequentially, renumber, merge ──────────────
    let mut pages = PageDataMap::new();
    let mut service_duration_ms = 0u64;

    for window in &batch_windows {
        if let Some(ref sink) = config.progress {
            sink.status(&format!(
                "Processing pages {} of {}",
                window.label(),
                total_pages
            ));
        }

        let service_start = Instant::now();
        let batch = process_window(&document, service.as_ref(), window)
            .await
            .map_err(|e| e.for_batch(window.first_page(), window.last_page()))?;
        service_duration_ms += service_start.elapsed().as_millis() as u64;

        // Each window maps to a disjoint global range, so collisions cannot
        // occur in a correct run; insert is last-write-wins regardless.
        for (local_key, grid) in batch {
            let global_key = to_global_key(window.start, &local_key);
            debug!(
                "Window {}: local key {:?} → global key {:?}",
                window.label(),
                local_key,
                global_key
            );
            pages.insert(global_key, grid);
        }
    }

    let stats = ExtractionStats {
        total_pages,
        extracted_pages: pages.len(),
        batches: batch_windows.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        service_duration_ms,
    };

    info!(
        "Extraction complete: {} pages from {} batches in {}ms",
        stats.extracted_pages, stats.batches, stats.total_duration_ms
    );

    Ok(ExtractionOutput { pages, stats })
}

/// Extract tables from a PDF file on disk.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2GridError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Pdf2GridError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    extract(&bytes, config).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    pdf_bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2GridError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2GridError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(pdf_bytes, config))
}

/// Report the page count of a PDF without extracting anything.
///
/// Does not require an API key.
pub fn page_count(pdf_bytes: &[u8]) -> Result<usize, Pdf2GridError> {
    Ok(split::SourceDocument::from_bytes(pdf_bytes)?.page_count())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// One batch: sub-document → service call → parse. Keys stay batch-local;
/// the caller renumbers them against the window offset.
async fn process_window(
    document: &split::SourceDocument,
    service: &dyn VisionService,
    window: &BatchWindow,
) -> Result<PageDataMap, Pdf2GridError> {
    let sub_document = document.window_bytes(window)?;
    let raw = service.extract_text(&sub_document).await?;
    parse::parse_grids(&raw)
}

/// Resolve the extraction service, from most-specific to least-specific:
///
/// 1. **Pre-built service** (`config.service`) — the caller constructed the
///    transport entirely; used as-is. This is the test seam.
/// 2. **Configured key** (`config.api_key`) — must be non-empty.
/// 3. **Environment** — `GEMINI_API_KEY`, then `GOOGLE_AI_API_KEY`.
fn resolve_service(config: &ExtractionConfig) -> Result<Arc<dyn VisionService>, Pdf2GridError> {
    if let Some(ref service) = config.service {
        return Ok(Arc::clone(service));
    }

    let api_key = match config.api_key {
        Some(ref key) => key.clone(),
        None => std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_AI_API_KEY"))
            .unwrap_or_default(),
    };
    if api_key.is_empty() {
        return Err(Pdf2GridError::MissingApiKey);
    }

    Ok(Arc::new(GeminiService::new(api_key, config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configured_key_is_rejected() {
        let config = ExtractionConfig::builder().api_key("").build().unwrap();
        let err = resolve_service(&config).unwrap_err();
        assert!(matches!(err, Pdf2GridError::MissingApiKey));
    }

    #[test]
    fn configured_key_builds_service() {
        let config = ExtractionConfig::builder().api_key("k").build().unwrap();
        assert!(resolve_service(&config).is_ok());
    }
}
