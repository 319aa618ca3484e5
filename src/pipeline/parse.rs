//! Response decoding: turn the service's raw text into page grids.
//!
//! ## Why repair at all?
//!
//! The service is asked for JSON-only output, but no guarantee holds. Three
//! defects show up in practice, and each gets a cheap, deterministic fix:
//!
//! - The payload arrives wrapped in a ` ```json ... ``` ` fence despite the
//!   prompt saying not to — strip one outer fence.
//! - Commentary leaks in as `//` lines — drop lines that are solely comments.
//! - The output budget cuts the JSON off mid-row — truncate back to the last
//!   complete row and close the open brackets, sacrificing only the
//!   incomplete trailing row/page.
//!
//! Repair strategies are an ordered list of pure functions tried in
//! sequence, terminating at the first success, so each is unit-testable
//! without a network call. A repaired parse can only ever contain rows that
//! decoded completely — a partially-parsed cell string cannot survive
//! `serde_json`.

use crate::error::Pdf2GridError;
use crate::output::PageDataMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Closing-bracket suffixes tried during truncation repair, shallowest first.
const REPAIR_SUFFIXES: &[&str] = &["}", "]}", "]]}", "]]]}"];

/// Decode a raw service response into a batch-local page map.
///
/// Applies the cleanup steps (fence, comment lines, leading prose), then a
/// direct decode, then truncation repair. Fails with
/// [`Pdf2GridError::Parse`] when nothing yields valid grid data.
pub fn parse_grids(raw: &str) -> Result<PageDataMap, Pdf2GridError> {
    let text = strip_outer_fence(raw.trim());
    let text = strip_comment_lines(&text);
    let text = strip_leading_prose(&text);

    match decode(text) {
        Ok(map) => Ok(map),
        Err(direct_err) => {
            debug!("Direct decode failed ({direct_err}), attempting truncation repair");
            repair_truncated(text).ok_or_else(|| Pdf2GridError::Parse {
                detail: direct_err.to_string(),
                truncated: text.rfind(']').is_some(),
            })
        }
    }
}

/// Strict decode of `{"page": [[cell, ...], ...], ...}` with cell coercion.
fn decode(text: &str) -> Result<PageDataMap, serde_json::Error> {
    let raw: BTreeMap<String, Vec<Vec<serde_json::Value>>> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .map(|(key, rows)| {
            let grid = rows
                .into_iter()
                .map(|row| row.into_iter().map(coerce_cell).collect())
                .collect();
            (key, grid)
        })
        .collect())
}

/// Every cell becomes a string: null → "", strings kept as-is, anything else
/// (numbers, booleans) rendered as its JSON text.
fn coerce_cell(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

// ── Cleanup steps ────────────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Strip one outer fenced code block, optionally tagged `json`.
fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

/// Drop lines that consist solely of a `//` line comment.
fn strip_comment_lines(input: &str) -> String {
    input
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Discard any prose before the first `{`.
fn strip_leading_prose(input: &str) -> &str {
    match input.find('{') {
        Some(idx) => &input[idx..],
        None => input,
    }
}

// ── Truncation repair ────────────────────────────────────────────────────

/// Recover a payload cut off mid-row or mid-page by a length limit.
///
/// Truncates immediately after the last `]` (the last complete row or page
/// close), then tries each closing suffix in [`REPAIR_SUFFIXES`] until one
/// decodes. The incomplete trailing fragment is dropped by construction.
fn repair_truncated(text: &str) -> Option<PageDataMap> {
    let cut = text.rfind(']')? + 1;
    let base = &text[..cut];

    for suffix in REPAIR_SUFFIXES {
        let candidate = format!("{base}{suffix}");
        if let Ok(map) = decode(&candidate) {
            debug!(
                "Truncation repair succeeded with suffix {:?} ({} pages)",
                suffix,
                map.len()
            );
            return Some(map);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn well_formed_payload_round_trips() {
        let map = parse_grids(r#"{"1": [["A","B"],["C","D"]], "2": [["x"]]}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["1"], grid(&[&["A", "B"], &["C", "D"]]));
        assert_eq!(map["2"], grid(&[&["x"]]));
    }

    #[test]
    fn serialized_map_reproduces_exactly() {
        let mut original = PageDataMap::new();
        original.insert("1".into(), grid(&[&["Name", "Qty"], &["Bolt", "12"]]));
        original.insert("2".into(), grid(&[&["", ""]]));

        let text = serde_json::to_string(&original).unwrap();
        assert_eq!(parse_grids(&text).unwrap(), original);
    }

    #[test]
    fn fenced_payload_parses_same_as_plain() {
        let plain = r#"{"1": [["A","B"]]}"#;
        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(parse_grids(&fenced).unwrap(), parse_grids(plain).unwrap());
    }

    #[test]
    fn untagged_fence_and_comment_line_stripped() {
        let input = "```\n// extracted tables below\n{\"1\": [[\"A\"]]}\n```";
        let map = parse_grids(input).unwrap();
        assert_eq!(map["1"], grid(&[&["A"]]));
    }

    #[test]
    fn leading_prose_discarded() {
        let input = "Here are the tables you asked for:\n{\"1\": [[\"A\"]]}";
        assert_eq!(parse_grids(input).unwrap()["1"], grid(&[&["A"]]));
    }

    #[test]
    fn null_cells_become_empty_strings() {
        let map = parse_grids(r#"{"1": [["A", null, "C"]]}"#).unwrap();
        assert_eq!(map["1"], grid(&[&["A", "", "C"]]));
    }

    #[test]
    fn numeric_cells_stringified() {
        let map = parse_grids(r#"{"1": [[1, 2.5, true]]}"#).unwrap();
        assert_eq!(map["1"], grid(&[&["1", "2.5", "true"]]));
    }

    #[test]
    fn truncated_mid_row_recovers_complete_rows() {
        let map = parse_grids(r#"{"1": [["A","B"],["C","#).unwrap();
        assert_eq!(map["1"], grid(&[&["A", "B"]]));
    }

    #[test]
    fn truncated_mid_cell_recovers_complete_rows() {
        let map = parse_grids(r#"{"1": [["A","B"],["C","D"#).unwrap();
        assert_eq!(map["1"], grid(&[&["A", "B"]]));
    }

    #[test]
    fn truncated_mid_second_page_drops_the_incomplete_page() {
        let map = parse_grids(r#"{"1": [["A","B"]], "2": [["C","#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["1"], grid(&[&["A", "B"]]));
    }

    #[test]
    fn no_partial_cell_ever_survives() {
        // Every recovered row must have fully decoded; the cut-off "C is gone.
        let map = parse_grids(r#"{"1": [["A","B"],["C"#).unwrap();
        for row in &map["1"] {
            assert!(!row.iter().any(|c| c.starts_with("C")));
        }
    }

    #[test]
    fn unrepairable_payload_is_parse_error_with_truncated_hint() {
        let err = parse_grids(r#"{"1": [["A]broken"#).unwrap_err();
        assert!(matches!(err, Pdf2GridError::Parse { truncated: true, .. }));
    }

    #[test]
    fn non_json_payload_is_parse_error_without_hint() {
        let err = parse_grids("the model refused to answer").unwrap_err();
        assert!(matches!(
            err,
            Pdf2GridError::Parse {
                truncated: false,
                ..
            }
        ));
    }

    #[test]
    fn empty_object_is_empty_map() {
        assert!(parse_grids("{}").unwrap().is_empty());
    }
}
