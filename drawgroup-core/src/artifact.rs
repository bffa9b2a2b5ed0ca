//! Input/output artifact schemas and canonical serialization: fixed key
//! order, integer pixel coordinates, fixed newline policy, so identical
//! inputs produce byte-identical output.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cells::CellCandidate;
use crate::config::GroupingConfig;
use crate::entities::{Block, Line, PageNum, Region, Token};
use crate::error::GroupingError;
use crate::sanitize::DroppedToken;

pub const GROUPING_VERSION: &str = "drawgroup-grouping-v1";

/// One page of the OCR artifact this pipeline consumes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrPage {
    pub image_height: i64,
    pub image_ref: String,
    pub image_width: i64,
    pub page_num: PageNum,
    pub tokens: Vec<Token>,
}

/// The document-level OCR artifact produced by Stage 1.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrDocument {
    pub doc_id: String,
    pub pages: Vec<OcrPage>,
}

impl OcrDocument {
    /// Validates the invariants required before any page is processed:
    /// `token_id` unique across the document, and every token's `page_num`
    /// matches the page that owns it.
    pub fn validate(&self) -> Result<(), GroupingError> {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for page in &self.pages {
            for token in &page.tokens {
                if token.page_num != page.page_num {
                    return Err(GroupingError::InputMalformed {
                        reason: format!(
                            "token {} has page_num {} but belongs to page {}",
                            token.token_id, token.page_num, page.page_num
                        ),
                    });
                }
                if !seen_ids.insert(token.token_id.as_str()) {
                    return Err(GroupingError::InputMalformed {
                        reason: format!("duplicate token_id '{}'", token.token_id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// One page of the grouping artifact Stage 2 emits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupingPage {
    pub blocks: Vec<Block>,
    pub cell_candidates: Vec<CellCandidate>,
    pub lines: Vec<Line>,
    pub page_num: PageNum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Region>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Counts {
    pub n_blocks: usize,
    pub n_lines: usize,
    pub n_regions: usize,
    pub n_tokens_in: usize,
    pub n_tokens_retained: usize,
}

/// Records the under-specified-behavior resolutions this implementation
/// made once, rather than leaving them to drift between docs and code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenQuestionResolutions {
    pub cell_candidates_empty_shape: String,
    pub line_y_overlap_definition: String,
    pub quadrant_rule: String,
    pub region_id_when_disabled: String,
}

impl Default for OpenQuestionResolutions {
    fn default() -> Self {
        Self {
            cell_candidates_empty_shape: "always `[]`, never `null`, regardless of enable_cell_candidates".into(),
            line_y_overlap_definition: "overlap_y / min(line_height, token_height)".into(),
            quadrant_rule: "block bbox entirely within x0 >= width/2 AND y0 >= height/2".into(),
            region_id_when_disabled: "regions field absent from page JSON, not an empty array".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupingMeta {
    pub config: GroupingConfig,
    pub counts: Counts,
    pub dropped_tokens: Vec<DroppedToken>,
    pub grouping_version: String,
    pub open_question_resolutions: OpenQuestionResolutions,
    pub warnings: Vec<String>,
}

/// The top-level grouping artifact. Key order at this level is the fixed
/// tuple `{doc_id, pages, meta}` rather than alphabetical order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupingArtifact {
    pub doc_id: String,
    pub pages: Vec<GroupingPage>,
    pub meta: GroupingMeta,
}

/// Serializes the artifact canonically: compact JSON (struct field
/// declaration order is the fixed lexical order), a single trailing
/// newline, no other whitespace.
pub fn to_canonical_json(artifact: &GroupingArtifact) -> Result<Vec<u8>, GroupingError> {
    let mut bytes = serde_json::to_vec(artifact).map_err(|e| GroupingError::InternalInvariantViolated {
        invariant: "canonical_serialization".into(),
        detail: e.to_string(),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BBox;

    fn token(id: &str, page_num: PageNum) -> Token {
        Token {
            bbox: BBox::new(0, 0, 10, 10),
            confidence: None,
            page_num,
            raw_confidence: None,
            text: "x".into(),
            token_id: id.into(),
        }
    }

    #[test]
    fn duplicate_token_id_across_pages_is_rejected() {
        let doc = OcrDocument {
            doc_id: "d1".into(),
            pages: vec![
                OcrPage {
                    image_height: 100,
                    image_ref: "p1.png".into(),
                    image_width: 100,
                    page_num: 1,
                    tokens: vec![token("dup", 1)],
                },
                OcrPage {
                    image_height: 100,
                    image_ref: "p2.png".into(),
                    image_width: 100,
                    page_num: 2,
                    tokens: vec![token("dup", 2)],
                },
            ],
        };
        assert!(matches!(doc.validate(), Err(GroupingError::InputMalformed { .. })));
    }

    #[test]
    fn page_num_mismatch_is_rejected() {
        let doc = OcrDocument {
            doc_id: "d1".into(),
            pages: vec![OcrPage {
                image_height: 100,
                image_ref: "p1.png".into(),
                image_width: 100,
                page_num: 1,
                tokens: vec![token("t1", 2)],
            }],
        };
        assert!(matches!(doc.validate(), Err(GroupingError::InputMalformed { .. })));
    }

    #[test]
    fn canonical_json_has_single_trailing_newline() {
        let artifact = GroupingArtifact {
            doc_id: "d1".into(),
            pages: vec![],
            meta: GroupingMeta {
                config: GroupingConfig::default(),
                counts: Counts::default(),
                dropped_tokens: vec![],
                grouping_version: GROUPING_VERSION.into(),
                open_question_resolutions: OpenQuestionResolutions::default(),
                warnings: vec![],
            },
        };
        let bytes = to_canonical_json(&artifact).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert!(!bytes.windows(2).any(|w| w == b"\n\n"));
    }
}
