//! End-to-end seed scenarios for the grouping pipeline.
//!
//! Each test drives `group_document` against a minimal OCR artifact and
//! checks the resulting grouping artifact against the geometry worked out
//! by hand, exercising the full sanitize -> lines -> blocks -> regions path
//! rather than any single module in isolation.

use drawgroup_core::config::GroupingConfig;
use drawgroup_core::entities::BBox;
use drawgroup_core::entities::Token;
use drawgroup_core::group_document;
use drawgroup_core::{OcrDocument};
use drawgroup_core::artifact::OcrPage;

fn token(id: &str, page_num: u32, x0: i64, y0: i64, x1: i64, y1: i64, text: &str) -> Token {
    Token {
        bbox: BBox::new(x0, y0, x1, y1),
        confidence: None,
        page_num,
        raw_confidence: None,
        text: text.into(),
        token_id: id.into(),
    }
}

fn single_page_doc(tokens: Vec<Token>) -> OcrDocument {
    OcrDocument {
        doc_id: "seed-doc".into(),
        pages: vec![OcrPage {
            image_height: 1000,
            image_ref: "p1.png".into(),
            image_width: 1000,
            page_num: 1,
            tokens,
        }],
    }
}

#[test]
fn s1_empty_document() {
    let doc = single_page_doc(vec![]);
    let artifact = group_document(&doc, &GroupingConfig::default()).unwrap();
    assert_eq!(artifact.pages.len(), 1);
    assert!(artifact.pages[0].lines.is_empty());
    assert!(artifact.pages[0].blocks.is_empty());
    assert!(artifact.pages[0].regions.as_ref().map(|r| r.is_empty()).unwrap_or(true));
    assert_eq!(artifact.meta.counts.n_lines, 0);
    assert_eq!(artifact.meta.counts.n_blocks, 0);
}

#[test]
fn s2_two_aligned_tokens_join_one_line_and_block() {
    let doc = single_page_doc(vec![
        token("T1", 1, 10, 10, 30, 20, "A"),
        token("T2", 1, 40, 11, 60, 21, "B"),
    ]);
    let artifact = group_document(&doc, &GroupingConfig::default()).unwrap();
    let page = &artifact.pages[0];
    assert_eq!(page.lines.len(), 1);
    assert_eq!(page.lines[0].line_id, "p001_l000000");
    assert_eq!(page.lines[0].token_ids, vec!["T1".to_string(), "T2".to_string()]);
    assert_eq!(page.lines[0].line_bbox, BBox::new(10, 10, 60, 21));
    assert_eq!(page.blocks.len(), 1);
    assert_eq!(page.blocks[0].block_id, "p001_b000000");
}

#[test]
fn s3_two_stacked_tokens_large_gap_split_blocks() {
    // median height 10, block_y_gap_k=1.5 -> gap threshold 15; actual gap 20.
    let doc = single_page_doc(vec![
        token("T1", 1, 10, 10, 30, 20, "A"),
        token("T2", 1, 10, 40, 30, 50, "B"),
    ]);
    let artifact = group_document(&doc, &GroupingConfig::default()).unwrap();
    let page = &artifact.pages[0];
    assert_eq!(page.lines.len(), 2);
    assert_eq!(page.blocks.len(), 2);
}

#[test]
fn s4_low_confidence_token_dropped_single_line_remains() {
    let mut config = GroupingConfig::default();
    config.confidence_floor = 0.5;
    let mut t1 = token("T1", 1, 10, 10, 30, 20, "A");
    t1.confidence = Some(0.9);
    let mut t2 = token("T2", 1, 40, 11, 60, 21, "B");
    t2.confidence = Some(0.2);
    let doc = single_page_doc(vec![t1, t2]);
    let artifact = group_document(&doc, &config).unwrap();
    let page = &artifact.pages[0];
    assert_eq!(page.lines.len(), 1);
    assert_eq!(page.lines[0].token_ids, vec!["T1".to_string()]);
    assert_eq!(artifact.meta.dropped_tokens.len(), 1);
    assert_eq!(artifact.meta.dropped_tokens[0].token_id, "T2");
    assert_eq!(
        format!("{:?}", artifact.meta.dropped_tokens[0].reason),
        "BelowConfidenceFloor"
    );
}

#[test]
fn s5_swapped_bbox_endpoints_are_repaired_and_retained() {
    let t1 = token("T1", 1, 30, 10, 10, 20, "A"); // x0 > x1 on input
    let doc = single_page_doc(vec![t1]);
    let artifact = group_document(&doc, &GroupingConfig::default()).unwrap();
    let page = &artifact.pages[0];
    assert_eq!(page.lines.len(), 1);
    assert_eq!(page.lines[0].line_bbox, BBox::new(10, 10, 30, 20));
    assert!(artifact.meta.warnings.iter().any(|w| w.contains("repaired_swapped")));
    assert!(artifact.meta.dropped_tokens.is_empty());
}

#[test]
fn s6_whitespace_token_is_dropped_page_is_empty() {
    let t1 = token("T1", 1, 10, 10, 30, 20, "   ");
    let doc = single_page_doc(vec![t1]);
    let artifact = group_document(&doc, &GroupingConfig::default()).unwrap();
    let page = &artifact.pages[0];
    assert!(page.lines.is_empty());
    assert_eq!(artifact.meta.dropped_tokens.len(), 1);
    assert_eq!(
        format!("{:?}", artifact.meta.dropped_tokens[0].reason),
        "Whitespace"
    );
}
