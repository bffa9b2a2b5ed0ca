//! Block builder: groups lines on a page into blocks using vertical spacing
//! and horizontal projection overlap.

use crate::config::GroupingConfig;
use crate::entities::{block_id, BBox, Block, Line, PageNum, Token};

/// median of `(y1 - y0)` over a page's retained tokens, matching the line
/// builder's definition so both thresholds are derived from one statistic.
fn median_token_height(tokens: &[Token]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut heights: Vec<i64> = tokens.iter().map(|t| t.bbox.height()).collect();
    heights.sort_unstable();
    let mid = heights.len() / 2;
    if heights.len().is_multiple_of(2) {
        (heights[mid - 1] + heights[mid]) as f64 / 2.0
    } else {
        heights[mid] as f64
    }
}

struct OpenBlock {
    bbox: BBox,
    line_indices: Vec<usize>,
}

/// Builds canonically ordered blocks from a page's lines (already in their
/// canonical line order) and the page's retained tokens (for the median
/// height statistic).
pub fn build_blocks(lines: &[Line], tokens: &[Token], page_num: PageNum, config: &GroupingConfig) -> Vec<Block> {
    if lines.is_empty() {
        return Vec::new();
    }

    let median_height = median_token_height(tokens);
    let gap_threshold = (config.min_block_gap_px as f64)
        .max((median_height * config.block_y_gap_k).round());

    let mut open_blocks: Vec<OpenBlock> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let joined = open_blocks.last_mut().is_some_and(|block| {
            let gap = (line.line_bbox.y0 - block.bbox.y1).max(0) as f64;
            let x_overlap = block.bbox.x_overlap_ratio(&line.line_bbox);
            gap <= gap_threshold && x_overlap >= config.block_x_overlap_threshold
        });

        if joined {
            let block = open_blocks.last_mut().unwrap();
            block.bbox.merge(&line.line_bbox);
            block.line_indices.push(idx);
        } else {
            open_blocks.push(OpenBlock {
                bbox: line.line_bbox,
                line_indices: vec![idx],
            });
        }
    }

    // Sort blocks by (y0, x0, min line_id in block); lines within a block
    // keep their existing order, never resorted.
    let mut built: Vec<OpenBlock> = open_blocks;
    built.sort_by(|a, b| {
        let min_id_a = a.line_indices.iter().map(|&i| &lines[i].line_id).min().unwrap();
        let min_id_b = b.line_indices.iter().map(|&i| &lines[i].line_id).min().unwrap();
        a.bbox
            .y0
            .cmp(&b.bbox.y0)
            .then(a.bbox.x0.cmp(&b.bbox.x0))
            .then(min_id_a.cmp(min_id_b))
    });

    built
        .into_iter()
        .enumerate()
        .map(|(index, block)| Block {
            block_bbox: block.bbox,
            block_id: block_id(page_num, index),
            line_ids: block.line_indices.into_iter().map(|i| lines[i].line_id.clone()).collect(),
        })
        .collect()
}
