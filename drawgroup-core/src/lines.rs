//! Line builder: partitions a page's retained tokens into lines by
//! vertical alignment, using geometry alone.

use crate::config::GroupingConfig;
use crate::entities::{line_id, BBox, Line, PageNum, Token};

/// median of `(y1 - y0)` over tokens; `0.0` if empty.
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

struct OpenLine {
    bbox: BBox,
    y_center_sum: f64,
    count: usize,
    token_indices: Vec<usize>,
}

impl OpenLine {
    fn y_center(&self) -> f64 {
        self.y_center_sum / self.count as f64
    }
}

/// Builds canonically ordered lines from a page's retained tokens.
/// Returns an empty vec for an empty token list.
pub fn build_lines(tokens: &[Token], page_num: PageNum, config: &GroupingConfig) -> Vec<Line> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let median_height = median_token_height(tokens);
    let y_threshold = (config.min_line_y_tol_px as f64)
        .max((median_height * config.line_y_center_k).round());

    // Sort indices by (y_center, x0, token_id) ascending.
    let mut order: Vec<usize> = (0..tokens.len()).collect();
    order.sort_by(|&a, &b| {
        let ya = tokens[a].bbox.y_center();
        let yb = tokens[b].bbox.y_center();
        ya.partial_cmp(&yb)
            .unwrap()
            .then(tokens[a].bbox.x0.cmp(&tokens[b].bbox.x0))
            .then(tokens[a].token_id.cmp(&tokens[b].token_id))
    });

    let mut open_lines: Vec<OpenLine> = Vec::new();

    for &idx in &order {
        let tok = &tokens[idx];
        let mut best: Option<(usize, f64)> = None;
        for (line_idx, line) in open_lines.iter().enumerate() {
            let delta = (line.y_center() - tok.bbox.y_center()).abs();
            if delta > y_threshold {
                continue;
            }
            if line.bbox.y_overlap_ratio(&tok.bbox) < config.line_y_overlap_threshold {
                continue;
            }
            match best {
                None => best = Some((line_idx, delta)),
                Some((_, best_delta)) if delta < best_delta => best = Some((line_idx, delta)),
                _ => {}
            }
        }

        match best {
            Some((line_idx, _)) => {
                let line = &mut open_lines[line_idx];
                line.bbox.merge(&tok.bbox);
                line.y_center_sum += tok.bbox.y_center();
                line.count += 1;
                line.token_indices.push(idx);
            }
            None => open_lines.push(OpenLine {
                bbox: tok.bbox,
                y_center_sum: tok.bbox.y_center(),
                count: 1,
                token_indices: vec![idx],
            }),
        }
    }

    // Within each line, fix reading order: (x0, y0, token_id) ascending.
    let mut built: Vec<(BBox, Vec<usize>)> = open_lines
        .into_iter()
        .map(|line| {
            let mut idxs = line.token_indices;
            idxs.sort_by(|&a, &b| {
                tokens[a]
                    .bbox
                    .x0
                    .cmp(&tokens[b].bbox.x0)
                    .then(tokens[a].bbox.y0.cmp(&tokens[b].bbox.y0))
                    .then(tokens[a].token_id.cmp(&tokens[b].token_id))
            });
            (line.bbox, idxs)
        })
        .collect();

    // Sort lines by (y0, x0, min token_id in line) ascending.
    built.sort_by(|(bbox_a, idxs_a), (bbox_b, idxs_b)| {
        let min_id_a = idxs_a.iter().map(|&i| &tokens[i].token_id).min().unwrap();
        let min_id_b = idxs_b.iter().map(|&i| &tokens[i].token_id).min().unwrap();
        bbox_a
            .y0
            .cmp(&bbox_b.y0)
            .then(bbox_a.x0.cmp(&bbox_b.x0))
            .then(min_id_a.cmp(min_id_b))
    });

    built
        .into_iter()
        .enumerate()
        .map(|(index, (bbox, idxs))| Line {
            line_bbox: bbox,
            line_id: line_id(page_num, index),
            token_ids: idxs.into_iter().map(|i| tokens[i].token_id.clone()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BBox;

    fn token(id: &str, x0: i64, y0: i64, x1: i64, y1: i64) -> Token {
        Token {
            bbox: BBox::new(x0, y0, x1, y1),
            confidence: None,
            page_num: 1,
            raw_confidence: None,
            text: "x".into(),
            token_id: id.into(),
        }
    }

    #[test]
    fn empty_tokens_produce_no_lines() {
        assert!(build_lines(&[], 1, &GroupingConfig::default()).is_empty());
    }

    #[test]
    fn single_token_makes_one_line() {
        let tokens = vec![token("t1", 10, 10, 30, 20)];
        let lines = build_lines(&tokens, 1, &GroupingConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_id, "p001_l000000");
        assert_eq!(lines[0].token_ids, vec!["t1".to_string()]);
    }

    #[test]
    fn two_aligned_tokens_join_one_line_s2() {
        // seed scenario S2: median_height=10, line_y_center_k=0.7 -> threshold 7
        let tokens = vec![token("T1", 10, 10, 30, 20), token("T2", 40, 11, 60, 21)];
        let lines = build_lines(&tokens, 1, &GroupingConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].token_ids, vec!["T1".to_string(), "T2".to_string()]);
        assert_eq!(lines[0].line_bbox, BBox::new(10, 10, 60, 21));
    }

    #[test]
    fn equal_y_centers_join_regardless_of_x_order() {
        let tokens = vec![token("B", 50, 10, 70, 20), token("A", 10, 10, 30, 20)];
        let lines = build_lines(&tokens, 1, &GroupingConfig::default());
        assert_eq!(lines.len(), 1);
        // reading order within the line is by x0 regardless of input order
        assert_eq!(lines[0].token_ids, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn far_apart_tokens_become_separate_lines() {
        let tokens = vec![token("t1", 10, 10, 30, 20), token("t2", 10, 400, 30, 410)];
        let lines = build_lines(&tokens, 1, &GroupingConfig::default());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn token_joins_nearest_center_among_two_candidates() {
        // A and B open two separate lines (they don't overlap each other
        // enough to merge). C overlaps both within threshold but sits
        // closer to B's center (delta 1.5) than A's (delta 12.5), and must
        // join B rather than the first line that matched.
        let tokens = vec![
            token("A", 0, 0, 20, 10),   // y_center=5
            token("B", 0, 11, 20, 21),  // y_center=16, overlap with A is 0 (disjoint)
            token("C", 0, 5, 20, 30),   // y_center=17.5, overlaps both A and B
        ];
        let mut config = GroupingConfig::default();
        config.min_line_y_tol_px = 13;
        let lines = build_lines(&tokens, 1, &config);
        assert_eq!(lines.len(), 2);
        let line_with_b = lines.iter().find(|l| l.token_ids.contains(&"B".to_string())).unwrap();
        assert!(line_with_b.token_ids.contains(&"C".to_string()));
        let line_with_a = lines.iter().find(|l| l.token_ids.contains(&"A".to_string())).unwrap();
        assert!(!line_with_a.token_ids.contains(&"C".to_string()));
    }

    #[test]
    fn input_order_does_not_affect_output() {
        let a = vec![token("t1", 10, 10, 30, 20), token("t2", 40, 11, 60, 21)];
        let b = vec![token("t2", 40, 11, 60, 21), token("t1", 10, 10, 30, 20)];
        let config = GroupingConfig::default();
        let lines_a = build_lines(&a, 1, &config);
        let lines_b = build_lines(&b, 1, &config);
        assert_eq!(
            lines_a.iter().map(|l| l.token_ids.clone()).collect::<Vec<_>>(),
            lines_b.iter().map(|l| l.token_ids.clone()).collect::<Vec<_>>()
        );
    }
}
