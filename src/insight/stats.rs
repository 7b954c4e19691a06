use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::insight::store::InsightStore;
use crate::insight::types::{Insight, InsightType};
use crate::retrieval::triggers::same_entity;

/// Response from [`store_stats`].
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_insights: u64,
    pub active_insights: u64,
    pub superseded_insights: u64,
    /// Active insights per type. Every type is present, zero or not.
    pub by_type: BTreeMap<String, u64>,
    /// Active insights per entity, sorted by entity name.
    pub entities: Vec<EntityStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_insight: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_insight: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStats {
    pub entity: String,
    pub count: u64,
    pub latest: Option<DateTime<Utc>>,
}

/// How understanding of one entity evolved: its active insights, oldest first,
/// split into thirds.
#[derive(Debug, Serialize)]
pub struct Progression {
    pub entity: String,
    pub early: Vec<Insight>,
    pub middle: Vec<Insight>,
    pub recent: Vec<Insight>,
}

/// Compute store statistics.
pub fn store_stats(store: &dyn InsightStore) -> Result<StatsResponse> {
    let all = store.all_insights()?;
    let active: Vec<&Insight> = all.iter().filter(|i| !i.is_superseded()).collect();

    let mut by_type: BTreeMap<String, u64> = InsightType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect();
    let mut entities: BTreeMap<&str, EntityStats> = BTreeMap::new();

    for insight in &active {
        *by_type.entry(insight.insight_type.as_str().to_string()).or_insert(0) += 1;
        for entity in &insight.entities {
            let stats = entities.entry(entity.as_str()).or_insert_with(|| EntityStats {
                entity: entity.clone(),
                count: 0,
                latest: None,
            });
            stats.count += 1;
            stats.latest = stats.latest.max(Some(insight.timestamp));
        }
    }

    Ok(StatsResponse {
        total_insights: all.len() as u64,
        active_insights: active.len() as u64,
        superseded_insights: (all.len() - active.len()) as u64,
        by_type,
        entities: entities.into_values().collect(),
        oldest_insight: all.iter().map(|i| i.timestamp).min(),
        newest_insight: all.iter().map(|i| i.timestamp).max(),
    })
}

/// Early / middle / recent split of an entity's active insights.
///
/// Insights are ordered by timestamp, then insertion order. With `n` insights
/// the cut points are `n/3` and `2n/3`, so the remainder lands in `recent`.
pub fn progression(store: &dyn InsightStore, entity: &str) -> Result<Progression> {
    let mut tied: Vec<Insight> = store
        .all_active_insights()?
        .into_iter()
        .filter(|i| i.entities.iter().any(|e| same_entity(e, entity)))
        .collect();
    // stable sort keeps insertion order among equal timestamps
    tied.sort_by_key(|i| i.timestamp);

    let n = tied.len();
    let recent = tied.split_off(2 * n / 3);
    let middle = tied.split_off(n / 3);

    Ok(Progression {
        entity: entity.to_string(),
        early: tied,
        middle,
        recent,
    })
}
