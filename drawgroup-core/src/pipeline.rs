//! Orchestration: sanitize → line builder → block builder → region labeler
//! → cell candidates, per page, then assembly into one artifact.
//!
//! Pages are independent and may be processed with `rayon`'s data-parallel
//! iterators; the merge step below always re-sorts by `page_num` before
//! handing the result to serialization, so parallelism never perturbs the
//! byte-identical output guarantee.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::instrument;

use crate::artifact::{
    Counts, GroupingArtifact, GroupingMeta, GroupingPage, OcrDocument, OcrPage,
    OpenQuestionResolutions, GROUPING_VERSION,
};
use crate::blocks::build_blocks;
use crate::cells::build_cell_candidates;
use crate::config::GroupingConfig;
use crate::entities::{Block, Line};
use crate::error::GroupingError;
use crate::lines::build_lines;
use crate::regions::label_regions;
use crate::sanitize::{sanitize_page_tokens, DroppedToken};

struct PageResult {
    page: GroupingPage,
    dropped: Vec<DroppedToken>,
    warnings: Vec<String>,
    n_tokens_in: usize,
}

#[instrument(skip(ocr_page, config), fields(page_num = ocr_page.page_num))]
fn group_page(ocr_page: &OcrPage, config: &GroupingConfig) -> Result<PageResult, GroupingError> {
    let n_tokens_in = ocr_page.tokens.len();
    let outcome = sanitize_page_tokens(ocr_page.tokens.clone(), config);

    let lines = build_lines(&outcome.retained, ocr_page.page_num, config);
    let blocks = build_blocks(&lines, &outcome.retained, ocr_page.page_num, config);

    verify_partition_invariants(&outcome.retained, &lines, &blocks)?;
    verify_bbox_tightness(&outcome.retained, &lines, &blocks)?;

    let regions = if config.disable_regions {
        None
    } else {
        Some(label_regions(
            &blocks,
            ocr_page.page_num,
            ocr_page.image_width,
            ocr_page.image_height,
        ))
    };

    let cell_candidates = if config.enable_cell_candidates {
        let lines_by_id: HashMap<&str, &Line> =
            lines.iter().map(|l| (l.line_id.as_str(), l)).collect();
        let column_tol = config.min_line_y_tol_px;
        blocks
            .iter()
            .flat_map(|b| build_cell_candidates(b, &lines_by_id, column_tol))
            .collect()
    } else {
        Vec::new()
    };

    let page = GroupingPage {
        blocks: blocks.clone(),
        cell_candidates,
        lines: lines.clone(),
        page_num: ocr_page.page_num,
        regions: regions.clone(),
    };

    tracing::debug!(
        n_lines = lines.len(),
        n_blocks = blocks.len(),
        n_regions = regions.map(|r| r.len()).unwrap_or(0),
        n_dropped = outcome.dropped.len(),
        "page grouped"
    );

    Ok(PageResult {
        page,
        dropped: outcome.dropped,
        warnings: outcome.warnings,
        n_tokens_in,
    })
}

fn verify_partition_invariants(
    retained: &[crate::entities::Token],
    lines: &[Line],
    blocks: &[Block],
) -> Result<(), GroupingError> {
    let mut seen_tokens: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for line in lines {
        for tid in &line.token_ids {
            if !seen_tokens.insert(tid.as_str()) {
                return Err(GroupingError::invariant(
                    "retained_tokens_partition_lines",
                    format!("token {tid} assigned to more than one line"),
                ));
            }
        }
    }
    if seen_tokens.len() != retained.len() {
        return Err(GroupingError::invariant(
            "retained_tokens_partition_lines",
            format!(
                "{} retained tokens but {} tokens assigned to lines",
                retained.len(),
                seen_tokens.len()
            ),
        ));
    }

    let mut seen_lines: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for block in blocks {
        for lid in &block.line_ids {
            if !seen_lines.insert(lid.as_str()) {
                return Err(GroupingError::invariant(
                    "lines_partition_blocks",
                    format!("line {lid} assigned to more than one block"),
                ));
            }
        }
    }
    if seen_lines.len() != lines.len() {
        return Err(GroupingError::invariant(
            "lines_partition_blocks",
            format!("{} lines but {} lines assigned to blocks", lines.len(), seen_lines.len()),
        ));
    }
    Ok(())
}

fn verify_bbox_tightness(
    retained: &[crate::entities::Token],
    lines: &[Line],
    blocks: &[Block],
) -> Result<(), GroupingError> {
    let tokens_by_id: HashMap<&str, &crate::entities::Token> =
        retained.iter().map(|t| (t.token_id.as_str(), t)).collect();
    for line in lines {
        let expected = crate::entities::BBox::union_all(
            line.token_ids.iter().map(|id| &tokens_by_id[id.as_str()].bbox),
        );
        if expected != line.line_bbox {
            return Err(GroupingError::invariant(
                "line_bbox_tightness",
                format!("line {} bbox does not equal union of its tokens", line.line_id),
            ));
        }
    }

    let lines_by_id: HashMap<&str, &Line> = lines.iter().map(|l| (l.line_id.as_str(), l)).collect();
    for block in blocks {
        let expected = crate::entities::BBox::union_all(
            block.line_ids.iter().map(|id| &lines_by_id[id.as_str()].line_bbox),
        );
        if expected != block.block_bbox {
            return Err(GroupingError::invariant(
                "block_bbox_tightness",
                format!("block {} bbox does not equal union of its lines", block.block_id),
            ));
        }
    }
    Ok(())
}

/// Groups a whole document: validates configuration, processes pages
/// (optionally in parallel), then merges strictly by `page_num` before
/// assembling the final artifact.
#[instrument(skip(doc, config), fields(doc_id = %doc.doc_id, n_pages = doc.pages.len()))]
pub fn group_document(doc: &OcrDocument, config: &GroupingConfig) -> Result<GroupingArtifact, GroupingError> {
    config.validate()?;

    let mut results: Vec<(PageNumKey, PageResult)> = doc
        .pages
        .par_iter()
        .map(|page| group_page(page, config).map(|r| (page.page_num, r)))
        .collect::<Result<Vec<_>, _>>()?;

    results.sort_by_key(|(page_num, _)| *page_num);

    let mut pages = Vec::with_capacity(results.len());
    let mut dropped_tokens = Vec::new();
    let mut warnings = Vec::new();
    let mut counts = Counts::default();
    let mut n_tokens_in_total = 0usize;

    for (_, result) in results {
        counts.n_lines += result.page.lines.len();
        counts.n_blocks += result.page.blocks.len();
        counts.n_regions += result.page.regions.as_ref().map(|r| r.len()).unwrap_or(0);
        n_tokens_in_total += result.n_tokens_in;
        counts.n_tokens_retained += result.page.lines.iter().map(|l| l.token_ids.len()).sum::<usize>();
        dropped_tokens.extend(result.dropped);
        warnings.extend(result.warnings);
        pages.push(result.page);
    }
    counts.n_tokens_in = n_tokens_in_total;

    Ok(GroupingArtifact {
        doc_id: doc.doc_id.clone(),
        pages,
        meta: GroupingMeta {
            config: config.clone(),
            counts,
            dropped_tokens,
            grouping_version: GROUPING_VERSION.into(),
            open_question_resolutions: OpenQuestionResolutions::default(),
            warnings,
        },
    })
}

type PageNumKey = crate::entities::PageNum;
