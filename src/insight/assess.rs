//! Content heuristics used when a candidate insight arrives without a type or
//! an effectiveness score.

use crate::insight::types::InsightType;

const POSITIVE_MARKERS: &[&str] = &[
    "worked",
    "effective",
    "helped",
    "breakthrough",
    "success",
    "able to",
    "finally",
    "strength",
    "trust",
    "clarity",
];

const NEGATIVE_MARKERS: &[&str] = &[
    "failed",
    "couldn't",
    "impossible",
    "gave up",
    "collapsed",
    "didn't work",
    "backfired",
    "made it worse",
];

const BREAKTHROUGH_PATTERNS: &[&str] = &[
    "shifted something fundamental",
    "just clicked",
    "finally understood",
    "breakthrough",
    "everything changed when",
    "realized that",
];

/// Lowercase and fold typographic apostrophes so "couldn’t" matches "couldn't".
pub(crate) fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'")
}

/// Estimate effectiveness from outcome language in the content.
///
/// More positive than negative markers scores `0.6 + 0.1n` (capped at 1.0);
/// more negative scores `0.4 - 0.1n` (floored at 0.0); a tie is neutral 0.5.
pub fn assess_effectiveness(content: &str) -> f64 {
    let text = normalize(content);
    let positive = POSITIVE_MARKERS.iter().filter(|m| text.contains(*m)).count();
    let negative = NEGATIVE_MARKERS.iter().filter(|m| text.contains(*m)).count();

    if positive > negative {
        (0.6 + 0.1 * positive as f64).min(1.0)
    } else if negative > positive {
        (0.4 - 0.1 * negative as f64).max(0.0)
    } else {
        0.5
    }
}

/// Breakthrough language marks an inflection point; everything else is an observation.
pub fn classify(content: &str) -> InsightType {
    let text = normalize(content);
    if BREAKTHROUGH_PATTERNS.iter().any(|p| text.contains(p)) {
        InsightType::Breakthrough
    } else {
        InsightType::Observation
    }
}
