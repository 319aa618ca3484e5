//! Prompts sent with every extraction request.
//!
//! Centralising the prompt text here serves two purposes:
//!
//! 1. **Single source of truth** — the structural rules below are a caller-
//!    visible contract (they define what a "cell" and a "row" mean in the
//!    output), so they live in exactly one place.
//!
//! 2. **Testability** — unit tests can assert the rules are present without
//!    touching a real vision API.
//!
//! The rules exist because the downstream grid model requires every row to
//! carry the table's full column set: a model that omits blank cells or
//! splits one visual cell into two array elements produces rows whose length
//! no longer matches the table, and the pipeline does not re-pad.

/// System instruction enumerating the structural rules for grid output.
///
/// Any replacement of the underlying model must preserve these rules: one
/// string element per visual cell, empty strings for blank cells, identical
/// row lengths, and batch-local page numbering.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a precise table-extraction engine. You receive a PDF document and return the tabular content of every page as JSON.

Output format: a single JSON object. Each key is the page number within the PDF you received, as a string: "1" for the first page, "2" for the second, and so on. Each value is a 2D array of strings: the page's table, row by row, cell by cell.

Follow these rules exactly:

1. CELLS
   - Every visual grid cell maps to exactly one string element.
   - A diagonally split or merged cell becomes one string, e.g. "A / B" — never two array elements.
   - Text stacked on multiple lines inside one cell merges into one string.
   - A genuinely blank cell is the empty string "" — never omit it.

2. ROWS
   - Every row contains the table's full column set; no column is skipped or left implicit.
   - All rows of a page's table have identical length.

3. PAGES
   - Number pages relative to the document you received: "1", "2", "3", ...
   - Include every page, even if its table is empty.

4. OUTPUT
   - Output ONLY the JSON object.
   - Do NOT wrap it in code fences.
   - Do NOT add commentary, comments, or explanations."#;

/// Per-call user prompt accompanying the PDF attachment.
pub const EXTRACTION_PROMPT: &str =
    "Extract the tables from every page of the attached PDF as JSON, following the system rules.";
