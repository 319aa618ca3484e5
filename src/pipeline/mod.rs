//! Pipeline stages for table extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. point the service at a different vision API)
//! without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! split ──▶ service ──▶ parse ──▶ renumber/merge
//! (lopdf)   (vision API) (repair)  (orchestrator)
//! ```
//!
//! 1. [`split`]   — cut the document into per-window sub-documents; the
//!    service is never shown pages outside the current batch
//! 2. [`service`] — send a sub-document to the vision API and return the raw
//!    text payload; the only stage with network I/O
//! 3. [`parse`]   — decode the payload into page grids, repairing fenced,
//!    commented, or truncated output along the way
//!
//! Renumbering and aggregation live in [`crate::extract`], because only the
//! orchestrator knows each window's offset into the full document.

pub mod parse;
pub mod service;
pub mod split;
