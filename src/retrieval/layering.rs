//! Progressive disclosure: partition a ranked candidate list into surface, mid,
//! and deep layers.
//!
//! One pass over the ranked list; each insight lands in the first layer whose
//! criteria it meets and that still has room, so the layers are disjoint.
//!
//! Normal mode, surface (capped at `surface_limit`): entity-matched insights that
//! are anchors, or recent with high effectiveness, or clear `surface_min_score`.
//! Each activated entity admits at most its trigger's `max_surface_insights`;
//! an insight is admitted while any of its activated entities has room, and
//! uses up one slot of each.
//!
//! Mid (capped at `mid_limit`): matched insights that were surface-eligible but
//! did not fit, or are within the mid window, or have moderate effectiveness,
//! or match only through themes.
//!
//! Deep (capped at `max_insights`): everything else, unmatched insights included.
//!
//! Crisis mode puts every anchor and every insight above `crisis_effectiveness`
//! in surface with no caps; the rest go through the normal mid and deep rules.

use std::collections::HashMap;

use crate::config::RetrievalConfig;
use crate::insight::types::InsightType;
use crate::retrieval::scorer::ScoredInsight;
use crate::retrieval::triggers::TriggerRegistry;

#[derive(Debug, Default)]
pub struct Layers {
    pub surface: Vec<ScoredInsight>,
    pub mid: Vec<ScoredInsight>,
    pub deep: Vec<ScoredInsight>,
}

/// Per-entity surface slots used so far in one query.
struct EntityBudget<'a> {
    registry: &'a TriggerRegistry,
    used: HashMap<String, usize>,
}

impl<'a> EntityBudget<'a> {
    fn new(registry: &'a TriggerRegistry) -> Self {
        Self {
            registry,
            used: HashMap::new(),
        }
    }

    fn has_room(&self, candidate: &ScoredInsight) -> bool {
        candidate.entity_matches.iter().any(|entity| {
            let used = self.used.get(entity).copied().unwrap_or(0);
            used < self.registry.cap_for(entity).unwrap_or(0)
        })
    }

    fn consume(&mut self, candidate: &ScoredInsight) {
        for entity in &candidate.entity_matches {
            *self.used.entry(entity.clone()).or_insert(0) += 1;
        }
    }
}

/// Layer placement rules over one ranked list.
pub struct LayerPolicy<'a> {
    config: &'a RetrievalConfig,
    registry: &'a TriggerRegistry,
}

impl<'a> LayerPolicy<'a> {
    pub fn new(config: &'a RetrievalConfig, registry: &'a TriggerRegistry) -> Self {
        Self { config, registry }
    }

    fn surface_eligible(&self, c: &ScoredInsight) -> bool {
        if !c.is_entity_matched() {
            return false;
        }
        let anchor = c.insight.insight_type == InsightType::Anchor;
        let recent_and_effective = c.age_days <= self.config.recency_window_days
            && c.insight.effectiveness_score >= self.config.surface_effectiveness;
        anchor || recent_and_effective || c.score >= self.config.surface_min_score
    }

    fn mid_eligible(&self, c: &ScoredInsight, surface_eligible: bool) -> bool {
        c.is_matched()
            && (surface_eligible
                || c.age_days <= self.config.mid_window_days
                || c.insight.effectiveness_score >= self.config.mid_effectiveness
                || c.is_theme_only())
    }

    fn crisis_eligible(&self, c: &ScoredInsight) -> bool {
        c.insight.insight_type == InsightType::Anchor
            || c.insight.effectiveness_score > self.config.crisis_effectiveness
    }

    /// Partition `ranked` (best-first) into layers.
    pub fn partition(&self, ranked: Vec<ScoredInsight>, crisis: bool, max_deep: usize) -> Layers {
        let mut layers = Layers::default();
        let mut budget = EntityBudget::new(self.registry);

        for candidate in ranked {
            if crisis && self.crisis_eligible(&candidate) {
                layers.surface.push(candidate);
                continue;
            }

            let surface_eligible = self.surface_eligible(&candidate);
            if !crisis
                && surface_eligible
                && layers.surface.len() < self.config.surface_limit
                && budget.has_room(&candidate)
            {
                budget.consume(&candidate);
                layers.surface.push(candidate);
            } else if layers.mid.len() < self.config.mid_limit
                && self.mid_eligible(&candidate, surface_eligible)
            {
                layers.mid.push(candidate);
            } else if layers.deep.len() < max_deep {
                layers.deep.push(candidate);
            }
        }

        layers
    }
}
