//! Deterministic, auditable conversion of OCR tokens into structural
//! primitives (lines, blocks, optional regions) — the hard core of an
//! engineering-drawing ingestion pipeline (Stage 2).
//!
//! This crate has no opinion on how a PDF was rasterized or how its pixels
//! were OCR'd (those are Stage 0/1 collaborators, consumed here only as a
//! JSON artifact) and no opinion on what any of the text *means* (that is
//! Stage 3/4). Everything here is geometry: bounding boxes, thresholds
//! derived from a page's own token-height statistics, and a handful of
//! fixed sort keys that together make every run of this pipeline on the
//! same input byte-identical to every other run.

pub mod artifact;
pub mod blocks;
pub mod cells;
pub mod config;
pub mod entities;
pub mod error;
pub mod io;
pub mod lines;
pub mod pipeline;
pub mod regions;
pub mod sanitize;

pub use artifact::{GroupingArtifact, OcrDocument};
pub use config::GroupingConfig;
pub use error::{GroupingError, Result};
pub use pipeline::group_document;
