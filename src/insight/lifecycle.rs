//! Write path: validation, insertion, and supersession.
//!
//! Insights are immutable once stored. A correction is a new insight plus a
//! supersession link: `old.superseded_by = new` and `new.supersedes = old`.
//! Links are id-to-id edges checked for cycles before they are written, so every
//! revision history is a simple chain.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

use crate::error::{InsightError, Result};
use crate::insight::assess;
use crate::insight::store::InsightStore;
use crate::insight::types::{Insight, NewInsight};

/// Upper bound on insight content length, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

const DEFAULT_GROWTH_STAGE: &str = "current";

/// Validate a candidate and fill in defaults, producing the record to persist.
pub fn build_insight(candidate: NewInsight, now: DateTime<Utc>) -> Result<Insight> {
    let content = candidate.content.trim().to_string();
    if content.is_empty() {
        return Err(InsightError::Validation("content must not be empty".into()));
    }
    let len = content.chars().count();
    if len > MAX_CONTENT_CHARS {
        return Err(InsightError::Validation(format!(
            "content must be at most {MAX_CONTENT_CHARS} characters, got {len}"
        )));
    }

    if let Some(score) = candidate.effectiveness_score {
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(InsightError::Validation(format!(
                "effectiveness_score must be between 0.0 and 1.0, got {score}"
            )));
        }
    }

    let id = match candidate.id {
        Some(id) if id.trim().is_empty() => {
            return Err(InsightError::Validation("id must not be blank".into()));
        }
        Some(id) => id.trim().to_string(),
        None => uuid::Uuid::now_v7().to_string(),
    };

    let insight_type = candidate
        .insight_type
        .unwrap_or_else(|| assess::classify(&content));
    let effectiveness_score = candidate
        .effectiveness_score
        .or_else(|| insight_type.default_effectiveness())
        .unwrap_or_else(|| assess::assess_effectiveness(&content));

    Ok(Insight {
        id,
        entities: clean_labels(candidate.entities),
        themes: clean_labels(candidate.themes),
        insight_type,
        effectiveness_score,
        timestamp: candidate.timestamp.unwrap_or(now),
        growth_stage: candidate
            .growth_stage
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GROWTH_STAGE.to_string()),
        supersedes: None,
        superseded_by: None,
        source_file: candidate.source_file,
        context: candidate.context,
        content,
    })
}

fn clean_labels(labels: Vec<String>) -> BTreeSet<String> {
    labels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Validate, persist, and return the new insight's id.
pub fn add_insight(
    store: &dyn InsightStore,
    candidate: NewInsight,
    now: DateTime<Utc>,
) -> Result<String> {
    let insight = build_insight(candidate, now)?;
    let id = store.insert(&insight)?;
    tracing::info!(
        id = %id,
        insight_type = %insight.insight_type,
        effectiveness = insight.effectiveness_score,
        entities = insight.entities.len(),
        "insight stored"
    );
    Ok(id)
}

/// Mark `old_id` as superseded by `new_id`.
///
/// Fails with `NotFound` if either id is missing and with `Cycle` if `new_id`
/// is `old_id` or one of its ancestors. Re-linking an existing pair is a no-op.
/// Nothing is written on failure.
pub fn supersede(store: &dyn InsightStore, old_id: &str, new_id: &str) -> Result<()> {
    let old = store
        .get(old_id)?
        .ok_or_else(|| InsightError::NotFound(old_id.to_string()))?;
    let new = store
        .get(new_id)?
        .ok_or_else(|| InsightError::NotFound(new_id.to_string()))?;

    if old_id == new_id || ancestors(store, &old)?.contains(new_id) {
        tracing::warn!(old = %old_id, new = %new_id, "supersession rejected: cycle");
        return Err(InsightError::Cycle {
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
        });
    }

    match old.superseded_by.as_deref() {
        Some(existing) if existing == new_id => return Ok(()),
        Some(existing) => {
            return Err(InsightError::Validation(format!(
                "{old_id} is already superseded by {existing}"
            )));
        }
        None => {}
    }
    if let Some(existing) = new.supersedes.as_deref() {
        return Err(InsightError::Validation(format!(
            "{new_id} already supersedes {existing}"
        )));
    }

    store.link_supersession(old_id, new_id)?;
    tracing::info!(old = %old_id, new = %new_id, "insight superseded");
    Ok(())
}

/// Ids reachable from `insight` by following `supersedes` links.
fn ancestors(store: &dyn InsightStore, insight: &Insight) -> Result<HashSet<String>> {
    let mut seen = HashSet::new();
    let mut next = insight.supersedes.clone();
    while let Some(id) = next {
        if !seen.insert(id.clone()) {
            break;
        }
        next = store.get(&id)?.and_then(|i| i.supersedes);
    }
    Ok(seen)
}

/// The full revision chain containing `id`, oldest first.
pub fn chain(store: &dyn InsightStore, id: &str) -> Result<Vec<Insight>> {
    let start = store
        .get(id)?
        .ok_or_else(|| InsightError::NotFound(id.to_string()))?;

    // walk back to the root
    let mut root = start;
    let mut seen = HashSet::from([root.id.clone()]);
    while let Some(prev_id) = root.supersedes.clone() {
        match store.get(&prev_id)? {
            Some(prev) if seen.insert(prev.id.clone()) => root = prev,
            _ => break,
        }
    }

    // then forward to the head
    let mut revisions = vec![root];
    let mut seen = HashSet::from([revisions[0].id.clone()]);
    while let Some(next_id) = revisions.last().and_then(|i| i.superseded_by.clone()) {
        match store.get(&next_id)? {
            Some(next) if seen.insert(next.id.clone()) => revisions.push(next),
            _ => break,
        }
    }
    Ok(revisions)
}
