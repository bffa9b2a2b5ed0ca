//! Core data model: geometry, tokens, and the structural primitives the
//! grouping pipeline builds on top of them.
//!
//! All geometry lives in page-image pixel space, origin top-left, x right,
//! y down. Field order within every struct is fixed alphabetically so that
//! `serde_json`'s declaration-order serialization is the artifact's
//! canonical key order.

use serde::{Deserialize, Serialize};

pub type PageNum = u32;

/// An axis-aligned bounding box in pixel space, `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BBox {
    pub x0: i64,
    pub x1: i64,
    pub y0: i64,
    pub y1: i64,
}

impl BBox {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn y_center(&self) -> f64 {
        (self.y0 + self.y1) as f64 / 2.0
    }

    /// Axis-aligned union bbox of `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            y0: self.y0.min(other.y0),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn merge(&mut self, other: &Self) {
        *self = self.union(other);
    }

    /// Union bbox over a non-empty slice. Panics on an empty slice; callers
    /// only invoke this once they know the member list is non-empty.
    pub fn union_all<'a>(mut boxes: impl Iterator<Item = &'a BBox>) -> Self {
        let first = boxes.next().expect("union_all requires at least one bbox");
        boxes.fold(*first, |acc, b| acc.union(b))
    }

    #[inline]
    fn overlap_y(&self, other: &Self) -> i64 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0)
    }

    #[inline]
    fn overlap_x(&self, other: &Self) -> i64 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0)
    }

    /// The y-overlap ratio used by the line builder: overlap divided by the
    /// smaller of the two heights.
    pub fn y_overlap_ratio(&self, other: &Self) -> f64 {
        let denom = self.height().min(other.height());
        if denom <= 0 {
            return 0.0;
        }
        self.overlap_y(other) as f64 / denom as f64
    }

    /// The x-overlap ratio used by the block builder: overlap divided by
    /// the smaller of the two widths.
    pub fn x_overlap_ratio(&self, other: &Self) -> f64 {
        let denom = self.width().min(other.width());
        if denom <= 0 {
            return 0.0;
        }
        self.overlap_x(other) as f64 / denom as f64
    }
}

pub type TokenId = String;

/// One OCR-detected text element. Never mutated after Stage 1 emits it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Token {
    pub bbox: BBox,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub page_num: PageNum,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_confidence: Option<f64>,
    pub text: String,
    pub token_id: TokenId,
}

/// A set of tokens sharing a horizontal band, in left-to-right reading order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Line {
    pub line_bbox: BBox,
    pub line_id: String,
    pub token_ids: Vec<TokenId>,
}

/// A vertically contiguous set of lines with compatible horizontal extent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Block {
    pub block_bbox: BBox,
    pub block_id: String,
    pub line_ids: Vec<String>,
}

/// A coarse, geometry-only structural tag for a region of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RegionLabel {
    #[serde(rename = "TITLE_BLOCK")]
    TitleBlock,
    #[serde(rename = "TABLE_LIKE")]
    TableLike,
    #[serde(rename = "NOTE")]
    Note,
    #[serde(rename = "ANNOTATION")]
    Annotation,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// An optional, coarser grouping of blocks labeled with a structural tag.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Region {
    pub block_ids: Vec<String>,
    pub label: RegionLabel,
    pub region_bbox: BBox,
    pub region_id: String,
}

pub fn line_id(page_num: PageNum, index: usize) -> String {
    format!("p{page_num:03}_l{index:06}")
}

pub fn block_id(page_num: PageNum, index: usize) -> String {
    format!("p{page_num:03}_b{index:06}")
}

pub fn region_id(page_num: PageNum, index: usize) -> String {
    format!("p{page_num:03}_r{index:06}")
}
