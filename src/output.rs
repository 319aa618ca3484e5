//! Output types: the aggregate page→grid map and per-run statistics.

use crate::pages::page_sort_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page's table content: rows of cells.
///
/// Each row is the literal visual column set of that table row — a genuinely
/// blank cell is the empty string, never an omitted element, so row length
/// always equals the table's true column count. The extraction service is
/// responsible for padding; this type does not re-pad.
pub type PageGrid = Vec<Vec<String>>;

/// Mapping from page key to that page's grid.
///
/// Keys are normally the decimal text form of a 1-based global page number;
/// non-numeric service labels carry a `-batch-pN` fallback suffix (see
/// [`crate::pages::to_global_key`]). Iteration order is unspecified — use
/// [`sorted_page_keys`] when order matters.
pub type PageDataMap = HashMap<String, PageGrid>;

/// Result of a successful extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Extracted grids, keyed by global page key.
    pub pages: PageDataMap,
    /// Supplementary statistics for the run.
    pub stats: ExtractionStats,
}

/// Statistics about one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Page count of the input document.
    pub total_pages: usize,
    /// Number of pages for which the service returned a grid.
    pub extracted_pages: usize,
    /// Number of batches sent to the service.
    pub batches: usize,
    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent inside service calls in milliseconds.
    pub service_duration_ms: u64,
}

/// Page keys of `pages` in natural numeric order ("9" before "10").
pub fn sorted_page_keys(pages: &PageDataMap) -> Vec<&str> {
    let mut keys: Vec<&str> = pages.keys().map(String::as_str).collect();
    keys.sort_by_key(|k| (page_sort_key(k), k.to_string()));
    keys
}
