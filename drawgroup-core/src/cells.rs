//! Reserved cell/box candidates. Disabled by default, emits an empty list
//! either way, never `null`. When enabled, candidates come from geometry
//! alone: lines within a block whose left edges align into a column.
//! Scoring is conservative and never gates emission.

use serde::{Deserialize, Serialize};

use crate::entities::{Block, Line};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellCandidate {
    pub line_ids: Vec<String>,
    pub score: f64,
    pub token_ids: Vec<String>,
}

/// Clusters a block's lines into column candidates by left-edge alignment.
/// `column_tol_px` is reused from the line builder's y-tolerance so the
/// clustering stays derived from the same geometry statistic, not a second
/// free parameter.
pub fn build_cell_candidates(block: &Block, lines_by_id: &std::collections::HashMap<&str, &Line>, column_tol_px: i64) -> Vec<CellCandidate> {
    let mut member_lines: Vec<&Line> = block
        .line_ids
        .iter()
        .filter_map(|id| lines_by_id.get(id.as_str()).copied())
        .collect();
    if member_lines.len() < 2 {
        return Vec::new();
    }
    member_lines.sort_by_key(|l| l.line_bbox.x0);

    let mut columns: Vec<Vec<&Line>> = Vec::new();
    for line in member_lines {
        match columns.iter_mut().find(|col| {
            let anchor = col[0].line_bbox.x0;
            (anchor - line.line_bbox.x0).abs() <= column_tol_px
        }) {
            Some(col) => col.push(line),
            None => columns.push(vec![line]),
        }
    }

    let total = block.line_ids.len() as f64;
    columns
        .into_iter()
        .filter(|col| col.len() >= 2)
        .map(|col| {
            let line_ids: Vec<String> = col.iter().map(|l| l.line_id.clone()).collect();
            let token_ids: Vec<String> = col.iter().flat_map(|l| l.token_ids.clone()).collect();
            let score = col.len() as f64 / total;
            CellCandidate {
                line_ids,
                score,
                token_ids,
            }
        })
        .collect()
}
