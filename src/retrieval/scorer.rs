//! Relevance scoring and deterministic ranking.
//!
//! composite = temporal_weight × effectiveness × (1 + match_bonus × (matches − 1))
//!
//! where `matches` counts activated entities the insight carries plus its themes
//! that occur in the query. Insights with no match score 0 and are only
//! eligible for the deep layer. Ties break on newer timestamp, then higher
//! effectiveness, then earlier insertion.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::config::RetrievalConfig;
use crate::insight::assess::normalize;
use crate::insight::types::Insight;
use crate::retrieval::triggers::{same_entity, TriggerMatch};

/// An insight with everything the layering engine needs to place it.
#[derive(Debug, Clone)]
pub struct ScoredInsight {
    pub insight: Insight,
    /// Position in the store scan (insertion order).
    pub seq: usize,
    pub age_days: i64,
    pub temporal_weight: f64,
    /// Activated entities this insight is tagged with, as the registry spells them.
    pub entity_matches: Vec<String>,
    /// Number of this insight's themes that occur in the query.
    pub theme_matches: usize,
    pub score: f64,
}

impl ScoredInsight {
    pub fn is_matched(&self) -> bool {
        !self.entity_matches.is_empty() || self.theme_matches > 0
    }

    pub fn is_entity_matched(&self) -> bool {
        !self.entity_matches.is_empty()
    }

    /// Related through themes but not tagged with any activated entity.
    pub fn is_theme_only(&self) -> bool {
        self.entity_matches.is_empty() && self.theme_matches > 0
    }
}

/// Recency weight: 1.0 inside the recency window, exponential decay after it,
/// never below the floor. Anchors are pinned at 1.0.
pub fn temporal_weight(insight: &Insight, now: DateTime<Utc>, config: &RetrievalConfig) -> f64 {
    if !insight.insight_type.decays() {
        return 1.0;
    }
    let age = insight.age_days(now);
    if age <= config.recency_window_days {
        return 1.0;
    }
    let past_window = (age - config.recency_window_days) as f64;
    (-config.decay_rate * past_window).exp().max(config.decay_floor)
}

/// Themes of `insight` that occur (case-insensitively) in the normalized query.
fn theme_overlap(insight: &Insight, normalized_query: &str) -> usize {
    if normalized_query.trim().is_empty() {
        return 0;
    }
    insight
        .themes
        .iter()
        .map(|t| normalize(t.trim()))
        .filter(|t| !t.is_empty() && normalized_query.contains(t.as_str()))
        .count()
}

/// Score every insight against the query and return them ranked best-first.
pub fn score_and_rank(
    insights: Vec<Insight>,
    triggers: &TriggerMatch,
    query: &str,
    now: DateTime<Utc>,
    config: &RetrievalConfig,
) -> Vec<ScoredInsight> {
    let normalized_query = normalize(query);

    let mut scored: Vec<ScoredInsight> = insights
        .into_iter()
        .enumerate()
        .map(|(seq, insight)| {
            let temporal_weight = temporal_weight(&insight, now, config);
            let entity_matches: Vec<String> = triggers
                .entities
                .iter()
                .filter(|t| insight.entities.iter().any(|e| same_entity(e, t)))
                .cloned()
                .collect();
            let theme_matches = theme_overlap(&insight, &normalized_query);

            let matches = entity_matches.len() + theme_matches;
            let score = if matches == 0 {
                0.0
            } else {
                let bonus = config.match_bonus * (matches - 1) as f64;
                temporal_weight * insight.effectiveness_score * (1.0 + bonus)
            };

            ScoredInsight {
                age_days: insight.age_days(now),
                insight,
                seq,
                temporal_weight,
                entity_matches,
                theme_matches,
                score,
            }
        })
        .collect();

    scored.sort_by(rank_order);
    scored
}

/// Best-first ordering with the full tie-break chain.
pub fn rank_order(a: &ScoredInsight, b: &ScoredInsight) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.insight.timestamp.cmp(&a.insight.timestamp))
        .then_with(|| {
            b.insight
                .effectiveness_score
                .total_cmp(&a.insight.effectiveness_score)
        })
        .then_with(|| a.seq.cmp(&b.seq))
}
