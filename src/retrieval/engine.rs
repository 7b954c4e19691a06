//! The retrieval engine: wires triggers, crisis detection, scoring, and layering
//! over an [`InsightStore`] and a [`Clock`].
//!
//! `retrieve` is read-only and a pure function of (query, insight set, now).
//! Writes go through [`lifecycle`](crate::insight::lifecycle) behind a single
//! writer lock, so a supersession's existence and cycle checks cannot race a
//! concurrent write.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::Clock;
use crate::config::{RetrievalConfig, StrataConfig};
use crate::error::Result;
use crate::insight::lifecycle;
use crate::insight::store::InsightStore;
use crate::insight::types::{Insight, NewInsight};
use crate::retrieval::crisis::CrisisDetector;
use crate::retrieval::layering::LayerPolicy;
use crate::retrieval::scorer::{score_and_rank, ScoredInsight};
use crate::retrieval::triggers::{TriggerMatch, TriggerRegistry};

/// Per-call retrieval knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrieveOptions {
    /// Deep-layer cap; `None` uses `retrieval.default_max_insights`.
    pub max_insights: Option<usize>,
    /// Score superseded insights too (history and audit views).
    pub include_superseded: bool,
}

/// Three disjoint, ranked layers plus what activated them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub surface: Vec<Insight>,
    pub mid: Vec<Insight>,
    pub deep: Vec<Insight>,
    pub triggers_activated: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub crisis_mode: bool,
}

impl RetrievalResult {
    pub fn total(&self) -> usize {
        self.surface.len() + self.mid.len() + self.deep.len()
    }
}

pub struct InsightEngine {
    store: Arc<dyn InsightStore>,
    clock: Arc<dyn Clock>,
    triggers: TriggerRegistry,
    crisis: CrisisDetector,
    config: RetrievalConfig,
    write_lock: Mutex<()>,
}

impl InsightEngine {
    pub fn new(
        store: Arc<dyn InsightStore>,
        clock: Arc<dyn Clock>,
        triggers: TriggerRegistry,
        crisis: CrisisDetector,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            clock,
            triggers,
            crisis,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Build an engine from loaded configuration, reading time from `clock`.
    pub fn from_config(
        store: Arc<dyn InsightStore>,
        clock: Arc<dyn Clock>,
        config: &StrataConfig,
    ) -> Self {
        Self::new(
            store,
            clock,
            TriggerRegistry::new(config.triggers.clone()),
            CrisisDetector::new(&config.crisis),
            config.retrieval.clone(),
        )
    }

    pub fn store(&self) -> &dyn InsightStore {
        self.store.as_ref()
    }

    pub fn detect_triggers(&self, text: &str) -> TriggerMatch {
        self.triggers.detect(text)
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        self.crisis.is_crisis(text)
    }

    /// Retrieve with default options.
    pub fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        self.retrieve_with(query, RetrieveOptions::default())
    }

    /// Detect triggers and crisis, score every candidate, and partition into layers.
    ///
    /// A blank query yields an empty result. A query that activates nothing and
    /// is not a crisis yields a deep-only result ordered by recency.
    pub fn retrieve_with(&self, query: &str, options: RetrieveOptions) -> Result<RetrievalResult> {
        if query.trim().is_empty() {
            tracing::debug!("blank query, nothing to retrieve");
            return Ok(RetrievalResult::default());
        }

        let triggers = self.triggers.detect(query);
        let crisis_mode = self.crisis.is_crisis(query);

        let candidates = if options.include_superseded {
            self.store.all_insights()?
        } else {
            self.store.all_active_insights()?
        };
        let candidate_count = candidates.len();

        let now = self.clock.now();
        let ranked = score_and_rank(candidates, &triggers, query, now, &self.config);
        let max_deep = options
            .max_insights
            .unwrap_or(self.config.default_max_insights);
        let layers = LayerPolicy::new(&self.config, &self.triggers).partition(
            ranked,
            crisis_mode,
            max_deep,
        );

        tracing::debug!(
            triggers = ?triggers.entities,
            crisis = crisis_mode,
            candidates = candidate_count,
            surface = layers.surface.len(),
            mid = layers.mid.len(),
            deep = layers.deep.len(),
            "retrieval complete"
        );

        Ok(RetrievalResult {
            surface: unwrap_layer(layers.surface),
            mid: unwrap_layer(layers.mid),
            deep: unwrap_layer(layers.deep),
            triggers_activated: triggers.entities,
            matched_keywords: triggers.keywords,
            crisis_mode,
        })
    }

    /// Validate and persist a new insight, timestamped by the engine's clock.
    pub fn add_insight(&self, candidate: NewInsight) -> Result<String> {
        let _guard = self.lock_writes();
        lifecycle::add_insight(self.store.as_ref(), candidate, self.clock.now())
    }

    /// Mark `old_id` as superseded by `new_id`.
    pub fn supersede(&self, old_id: &str, new_id: &str) -> Result<()> {
        let _guard = self.lock_writes();
        lifecycle::supersede(self.store.as_ref(), old_id, new_id)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unwrap_layer(layer: Vec<ScoredInsight>) -> Vec<Insight> {
    layer.into_iter().map(|s| s.insight).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::InsightError;
    use crate::insight::store::InsightArena;
    use crate::insight::types::InsightType;
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn engine() -> InsightEngine {
        InsightEngine::from_config(
            Arc::new(InsightArena::new()),
            Arc::new(FixedClock(now())),
            &StrataConfig::default(),
        )
    }

    fn ids(layer: &[Insight]) -> Vec<&str> {
        layer.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_nothing() {
        let engine = engine();
        engine
            .add_insight(NewInsight::new("A is trustworthy.").entity("A").kind(InsightType::Anchor))
            .unwrap();
        for q in ["", "   ", "\n"] {
            let result = engine.retrieve(q).unwrap();
            assert_eq!(result, RetrievalResult::default());
        }
    }

    #[test]
    fn unmatched_query_is_deep_only() {
        let engine = engine();
        engine
            .add_insight(NewInsight::new("older").at(now() - Duration::days(3)))
            .unwrap();
        engine
            .add_insight(NewInsight::new("newer").at(now() - Duration::days(1)))
            .unwrap();

        let result = engine.retrieve("what a lovely afternoon").unwrap();
        assert!(!result.crisis_mode);
        assert!(result.triggers_activated.is_empty());
        assert!(result.surface.is_empty() && result.mid.is_empty());
        let contents: Vec<&str> = result.deep.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["newer", "older"]);
    }

    #[test]
    fn max_insights_caps_deep() {
        let engine = engine();
        for n in 0..6 {
            engine.add_insight(NewInsight::new(format!("note {n}"))).unwrap();
        }
        let result = engine
            .retrieve_with(
                "nothing relevant",
                RetrieveOptions {
                    max_insights: Some(2),
                    include_superseded: false,
                },
            )
            .unwrap();
        assert_eq!(result.deep.len(), 2);
    }

    #[test]
    fn superseded_insights_need_the_flag() {
        let engine = engine();
        let old = engine
            .add_insight(NewInsight::new("trust comes slowly").entity("A").kind(InsightType::Strategy))
            .unwrap();
        let new = engine
            .add_insight(NewInsight::new("trust is earned in small steps").entity("A").kind(InsightType::Strategy))
            .unwrap();
        engine.supersede(&old, &new).unwrap();

        let result = engine.retrieve("trust").unwrap();
        let all: Vec<&str> = ids(&result.surface)
            .into_iter()
            .chain(ids(&result.mid))
            .chain(ids(&result.deep))
            .collect();
        assert!(all.contains(&new.as_str()));
        assert!(!all.contains(&old.as_str()));

        let history = engine
            .retrieve_with(
                "trust",
                RetrieveOptions {
                    include_superseded: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(history.total(), 2);
    }

    #[test]
    fn engine_write_errors_surface_unchanged() {
        let engine = engine();
        let a = engine.add_insight(NewInsight::new("one")).unwrap();
        assert!(matches!(
            engine.supersede(&a, "missing"),
            Err(InsightError::NotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            engine.add_insight(NewInsight::new("   ")),
            Err(InsightError::Validation(_))
        ));
    }
}
