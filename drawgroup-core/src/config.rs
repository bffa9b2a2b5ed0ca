//! Immutable grouping configuration: constructed once at startup, validated
//! once, then threaded explicitly into every builder. Never read from the
//! environment or a global.

use serde::{Deserialize, Serialize};

use crate::error::GroupingError;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupingConfig {
    pub bbox_repair: bool,
    pub block_x_overlap_threshold: f64,
    pub block_y_gap_k: f64,
    pub confidence_floor: f64,
    pub disable_regions: bool,
    pub enable_cell_candidates: bool,
    pub keep_whitespace_tokens: bool,
    pub line_y_center_k: f64,
    pub line_y_overlap_threshold: f64,
    pub min_block_gap_px: i64,
    pub min_line_y_tol_px: i64,
    /// Recorded in `meta.config` for provenance only. Lines, blocks, and
    /// regions never carry token text, so there is no text field for this
    /// to omit; it is an intentional no-op in this output shape, kept so a
    /// caller's config round-trips through `meta` unchanged.
    pub omit_text_fields: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            bbox_repair: true,
            block_x_overlap_threshold: 0.1,
            block_y_gap_k: 1.5,
            confidence_floor: 0.0,
            disable_regions: false,
            enable_cell_candidates: false,
            keep_whitespace_tokens: false,
            line_y_center_k: 0.7,
            line_y_overlap_threshold: 0.5,
            min_block_gap_px: 2,
            min_line_y_tol_px: 2,
            omit_text_fields: false,
        }
    }
}

impl GroupingConfig {
    /// Validates the configuration once, before any page is processed.
    pub fn validate(&self) -> Result<(), GroupingError> {
        let checks: &[(bool, &str)] = &[
            (
                self.confidence_floor >= 0.0 && self.confidence_floor <= 1.0,
                "confidence_floor must be in [0, 1]",
            ),
            (
                self.line_y_center_k >= 0.0,
                "line_y_center_k must be non-negative",
            ),
            (
                self.line_y_overlap_threshold >= 0.0 && self.line_y_overlap_threshold <= 1.0,
                "line_y_overlap_threshold must be in [0, 1]",
            ),
            (
                self.min_line_y_tol_px >= 0,
                "min_line_y_tol_px must be non-negative",
            ),
            (
                self.block_y_gap_k >= 0.0,
                "block_y_gap_k must be non-negative",
            ),
            (
                self.min_block_gap_px >= 0,
                "min_block_gap_px must be non-negative",
            ),
            (
                self.block_x_overlap_threshold >= 0.0 && self.block_x_overlap_threshold <= 1.0,
                "block_x_overlap_threshold must be in [0, 1]",
            ),
        ];
        for (ok, reason) in checks {
            if !ok {
                return Err(GroupingError::ConfigInvalid {
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }
}
