//! Page-window arithmetic: batch partitioning, key renumbering, sort keys.
//!
//! Everything in this module is a pure function over page indices and page-key
//! strings, so the orchestrator's bookkeeping can be tested without a PDF or
//! a network in sight.
//!
//! ## Key renumbering
//!
//! The extraction service is told to label pages "1", "2", "3" relative to the
//! sub-document it receives — it never sees the surrounding document and
//! cannot know a page's true position. Only the orchestrator knows each
//! window's offset into the full document, so the local→global translation
//! happens here, not in the service.

/// A half-open range of 0-based page indices processed in one service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    /// First page index in the window (0-based, inclusive).
    pub start: usize,
    /// One past the last page index (0-based, exclusive).
    pub end: usize,
}

impl BatchWindow {
    /// 1-based number of the first page, for messages and errors.
    pub fn first_page(&self) -> usize {
        self.start + 1
    }

    /// 1-based number of the last page, for messages and errors.
    pub fn last_page(&self) -> usize {
        self.end
    }

    /// Number of pages in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the window covers no pages.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Human-readable 1-based range, e.g. "4-5", or "7" for a single page.
    pub fn label(&self) -> String {
        if self.len() == 1 {
            self.first_page().to_string()
        } else {
            format!("{}-{}", self.first_page(), self.last_page())
        }
    }
}

/// Partition `[0, total_pages)` into consecutive windows of `batch_size`.
///
/// The final window may be shorter. Windows cover the range exactly: no gap,
/// no overlap, `ceil(total_pages / batch_size)` windows in total.
pub fn windows(total_pages: usize, batch_size: usize) -> Vec<BatchWindow> {
    assert!(batch_size > 0, "batch size must be non-zero");
    (0..total_pages)
        .step_by(batch_size)
        .map(|start| BatchWindow {
            start,
            end: (start + batch_size).min(total_pages),
        })
        .collect()
}

/// Translate a batch-local page key into a document-global page key.
///
/// Digits in `local_key` are concatenated and parsed as a decimal number `n`;
/// the global key is the decimal string of `window_start + n`. A key with no
/// numeric content falls back to `"{local_key}-batch-p{first_page}"`, which
/// keeps the original label traceable to its source batch and can never
/// collide with a numeric global key.
pub fn to_global_key(window_start: usize, local_key: &str) -> String {
    let digits: String = local_key.chars().filter(char::is_ascii_digit).collect();
    match digits.parse::<usize>() {
        Ok(n) => (window_start + n).to_string(),
        Err(_) => format!("{}-batch-p{}", local_key, window_start + 1),
    }
}

/// Derive a numeric ordering key from a page-key string.
///
/// Digits are concatenated and parsed base-10; keys without digits sort
/// first (0). Used wherever page keys must iterate in natural numeric order
/// rather than lexical order ("10" after "9").
pub fn page_sort_key(page_key: &str) -> u64 {
    page_key
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
