//! Plain-text rendering of a retrieval result for inclusion in a conversation.
//!
//! Only the surface layer is rendered; mid and deep are for explicit drill-down.

use crate::retrieval::engine::RetrievalResult;

const CRISIS_HEADER: &str = "[CRISIS ANCHORS - Hold onto these:]";
const CRISIS_FALLBACK: &str = "[Crisis Mode: No specific anchors found, but you are not alone]";

/// Render the surface layer, one line per insight.
///
/// Crisis results become a bulleted anchor list (or a fallback line when
/// nothing surfaced). Otherwise anchors and breakthroughs are tagged as key
/// insights and everything else as context. An empty surface renders as "".
pub fn format_for_conversation(result: &RetrievalResult) -> String {
    if result.crisis_mode {
        if result.surface.is_empty() {
            return CRISIS_FALLBACK.to_string();
        }
        let mut lines = vec![CRISIS_HEADER.to_string()];
        lines.extend(result.surface.iter().map(|i| format!("• {}", i.content)));
        return lines.join("\n");
    }

    result
        .surface
        .iter()
        .map(|i| {
            if i.insight_type.is_key() {
                format!("[Key insight: {}]", i.content)
            } else {
                format!("[Context: {}]", i.content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::types::{Insight, InsightType};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn insight(content: &str, kind: InsightType) -> Insight {
        Insight {
            id: content.into(),
            content: content.into(),
            entities: BTreeSet::new(),
            themes: BTreeSet::new(),
            insight_type: kind,
            effectiveness_score: 0.9,
            timestamp: Utc::now(),
            growth_stage: "current".into(),
            supersedes: None,
            superseded_by: None,
            source_file: None,
            context: None,
        }
    }

    #[test]
    fn key_insights_and_context_are_tagged() {
        let result = RetrievalResult {
            surface: vec![
                insight("A is trustworthy.", InsightType::Anchor),
                insight("It finally clicked.", InsightType::Breakthrough),
                insight("Take a walk first.", InsightType::Strategy),
            ],
            ..Default::default()
        };
        assert_eq!(
            format_for_conversation(&result),
            "[Key insight: A is trustworthy.]\n\
             [Key insight: It finally clicked.]\n\
             [Context: Take a walk first.]"
        );
    }

    #[test]
    fn empty_surface_renders_nothing() {
        let result = RetrievalResult {
            deep: vec![insight("buried", InsightType::Observation)],
            ..Default::default()
        };
        assert_eq!(format_for_conversation(&result), "");
    }

    #[test]
    fn crisis_renders_bullets() {
        let result = RetrievalResult {
            surface: vec![
                insight("You have survived this before.", InsightType::Anchor),
                insight("Breathe out slowly.", InsightType::Strategy),
            ],
            crisis_mode: true,
            ..Default::default()
        };
        assert_eq!(
            format_for_conversation(&result),
            "[CRISIS ANCHORS - Hold onto these:]\n\
             • You have survived this before.\n\
             • Breathe out slowly."
        );
    }

    #[test]
    fn crisis_without_anchors_still_answers() {
        let result = RetrievalResult {
            crisis_mode: true,
            ..Default::default()
        };
        assert_eq!(format_for_conversation(&result), CRISIS_FALLBACK);
    }
}
