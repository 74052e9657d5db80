// src/extract/mod.rs
// =============================================================================
// This module turns a fetched HTML body into the pieces the engine cares
// about: a title, a short content summary, and a normalized outbound link
// list.
//
// Submodules:
// - page: title / summary / link extraction and URL normalization
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `extract::parse_page()` instead of
// `extract::page::parse_page()`.
// =============================================================================

mod page;

// Only the two entry points callers actually name; ParsedPage is reached
// through parse_page's return type
pub use page::{normalize_seed, parse_page};
