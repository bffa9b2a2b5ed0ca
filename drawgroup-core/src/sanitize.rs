//! Token intake and sanitization: bbox repair, whitespace filtering, and
//! confidence floor, applied in that fixed order.

use serde::{Deserialize, Serialize};

use crate::config::GroupingConfig;
use crate::entities::Token;

/// Why a token was dropped (or, for `RepairedSwapped`, merely repaired).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum DropReason {
    #[serde(rename = "zero_area")]
    ZeroArea,
    #[serde(rename = "whitespace")]
    Whitespace,
    #[serde(rename = "below_confidence_floor")]
    BelowConfidenceFloor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DroppedToken {
    pub reason: DropReason,
    pub token_id: String,
}

/// Rounds a confidence value to 6 decimal places so that values read back
/// through float-imprecise upstream OCR tooling still serialize identically
/// across runs.
fn round_confidence(conf: f64) -> f64 {
    (conf * 1_000_000.0).round() / 1_000_000.0
}

pub struct SanitizeOutcome {
    pub retained: Vec<Token>,
    /// Sorted by `token_id`, independent of input token order.
    pub dropped: Vec<DroppedToken>,
    /// Warnings such as `repaired_swapped`, sorted lexically so input token
    /// order never affects their position in the artifact.
    pub warnings: Vec<String>,
}

/// Runs bbox repair, the whitespace filter, and the confidence floor over a
/// single page's tokens, in that fixed order. The result does not depend
/// on the input token order.
pub fn sanitize_page_tokens(tokens: Vec<Token>, config: &GroupingConfig) -> SanitizeOutcome {
    let mut dropped = Vec::new();
    let mut warnings = Vec::new();
    let mut repaired = Vec::with_capacity(tokens.len());

    for mut token in tokens {
        if config.bbox_repair {
            let b = &mut token.bbox;
            if b.x0 > b.x1 {
                std::mem::swap(&mut b.x0, &mut b.x1);
                warnings.push(format!("repaired_swapped x for token {}", token.token_id));
            }
            if b.y0 > b.y1 {
                std::mem::swap(&mut b.y0, &mut b.y1);
                warnings.push(format!("repaired_swapped y for token {}", token.token_id));
            }
        }
        if token.bbox.width() == 0 || token.bbox.height() == 0 {
            dropped.push(DroppedToken {
                reason: DropReason::ZeroArea,
                token_id: token.token_id,
            });
            continue;
        }
        repaired.push(token);
    }

    let mut after_whitespace = Vec::with_capacity(repaired.len());
    for token in repaired {
        if !config.keep_whitespace_tokens && token.text.trim().is_empty() {
            dropped.push(DroppedToken {
                reason: DropReason::Whitespace,
                token_id: token.token_id,
            });
            continue;
        }
        after_whitespace.push(token);
    }

    let mut retained = Vec::with_capacity(after_whitespace.len());
    for mut token in after_whitespace {
        if let Some(conf) = token.confidence {
            if conf < config.confidence_floor {
                dropped.push(DroppedToken {
                    reason: DropReason::BelowConfidenceFloor,
                    token_id: token.token_id,
                });
                continue;
            }
        }
        token.confidence = token.confidence.map(round_confidence);
        retained.push(token);
    }

    // Both ledgers are collected in input token order above; re-sort them
    // here so a permuted input token order never changes the artifact.
    dropped.sort_by(|a, b| a.token_id.cmp(&b.token_id));
    warnings.sort();

    SanitizeOutcome {
        retained,
        dropped,
        warnings,
    }
}
