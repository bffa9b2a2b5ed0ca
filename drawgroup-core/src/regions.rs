//! Region labeler: coarse, geometry-only region candidates. Token text is
//! never inspected.

use crate::entities::{region_id, Block, BBox, Region, RegionLabel};

/// Labels blocks on a page using only block and page geometry. The
/// bottom-right quadrant test is `x0 >= W/2 AND y0 >= H/2`.
pub fn label_regions(blocks: &[Block], page_num: u32, page_width: i64, page_height: i64) -> Vec<Region> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let half_w = page_width as f64 / 2.0;
    let half_h = page_height as f64 / 2.0;

    let title_block_indices: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            b.block_bbox.x0 as f64 >= half_w && b.block_bbox.y0 as f64 >= half_h
        })
        .map(|(i, _)| i)
        .collect();

    let mut regions: Vec<(BBox, RegionLabel, Vec<usize>)> = Vec::new();

    if !title_block_indices.is_empty() {
        let bbox = BBox::union_all(title_block_indices.iter().map(|&i| &blocks[i].block_bbox));
        regions.push((bbox, RegionLabel::TitleBlock, title_block_indices.clone()));

        let remaining: Vec<usize> = (0..blocks.len())
            .filter(|i| !title_block_indices.contains(i))
            .collect();
        if !remaining.is_empty() {
            let bbox = BBox::union_all(remaining.iter().map(|&i| &blocks[i].block_bbox));
            regions.push((bbox, RegionLabel::Unknown, remaining));
        }
    } else {
        let all: Vec<usize> = (0..blocks.len()).collect();
        let bbox = BBox::union_all(all.iter().map(|&i| &blocks[i].block_bbox));
        regions.push((bbox, RegionLabel::Unknown, all));
    }

    // Sort regions by (y0, x0, first block_id).
    regions.sort_by(|(bbox_a, _, idxs_a), (bbox_b, _, idxs_b)| {
        let first_a = &blocks[idxs_a[0]].block_id;
        let first_b = &blocks[idxs_b[0]].block_id;
        bbox_a
            .y0
            .cmp(&bbox_b.y0)
            .then(bbox_a.x0.cmp(&bbox_b.x0))
            .then(first_a.cmp(first_b))
    });

    regions
        .into_iter()
        .enumerate()
        .map(|(index, (bbox, label, idxs))| Region {
            block_ids: idxs.into_iter().map(|i| blocks[i].block_id.clone()).collect(),
            label,
            region_bbox: bbox,
            region_id: region_id(page_num, index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::block_id;

    fn block(id: &str, bbox: BBox) -> Block {
        Block {
            block_bbox: bbox,
            block_id: id.into(),
            line_ids: vec![],
        }
    }

    #[test]
    fn empty_blocks_produce_no_regions() {
        assert!(label_regions(&[], 1, 1000, 1000).is_empty());
    }

    #[test]
    fn title_block_quadrant_match() {
        let blocks = vec![
            block(&block_id(1, 0), BBox::new(10, 10, 100, 100)),
            block(&block_id(1, 1), BBox::new(600, 600, 900, 900)),
        ];
        let regions = label_regions(&blocks, 1, 1000, 1000);
        assert_eq!(regions.len(), 2);
        let title = regions.iter().find(|r| r.label == RegionLabel::TitleBlock).unwrap();
        assert_eq!(title.block_ids, vec![block_id(1, 1)]);
        let unknown = regions.iter().find(|r| r.label == RegionLabel::Unknown).unwrap();
        assert_eq!(unknown.block_ids, vec![block_id(1, 0)]);
    }

    #[test]
    fn no_quadrant_match_falls_back_to_single_unknown() {
        let blocks = vec![
            block(&block_id(1, 0), BBox::new(10, 10, 100, 100)),
            block(&block_id(1, 1), BBox::new(200, 200, 300, 300)),
        ];
        let regions = label_regions(&blocks, 1, 1000, 1000);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].label, RegionLabel::Unknown);
        assert_eq!(regions[0].block_ids.len(), 2);
    }

    #[test]
    fn block_straddling_quadrant_boundary_is_not_a_title_candidate() {
        // must lie entirely inside the quadrant; x0 < half_w disqualifies it
        let blocks = vec![block(&block_id(1, 0), BBox::new(400, 600, 900, 900))];
        let regions = label_regions(&blocks, 1, 1000, 1000);
        assert_eq!(regions[0].label, RegionLabel::Unknown);
    }
}
