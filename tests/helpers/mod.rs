#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use strata::clock::FixedClock;
use strata::config::StrataConfig;
use strata::db;
use strata::insight::store::SqliteStore;
use strata::insight::types::{InsightType, NewInsight};
use strata::retrieval::InsightEngine;

/// The instant every test engine treats as "now".
pub fn test_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T12:00:00+00:00")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    test_now() - Duration::days(days)
}

/// Open a fresh in-memory SQLite store with schema applied.
pub fn test_store() -> Arc<SqliteStore> {
    let conn = db::open_memory_database().unwrap();
    Arc::new(SqliteStore::new(conn))
}

/// Engine over a fresh in-memory store, default config, clock pinned to [`test_now`].
pub fn test_engine() -> InsightEngine {
    test_engine_with(StrataConfig::default())
}

pub fn test_engine_with(config: StrataConfig) -> InsightEngine {
    InsightEngine::from_config(test_store(), Arc::new(FixedClock(test_now())), &config)
}

/// Add an insight with explicit type, score, age, and entities. Returns the id.
pub fn add(
    engine: &InsightEngine,
    content: &str,
    kind: InsightType,
    effectiveness: f64,
    age_days: i64,
    entities: &[&str],
) -> String {
    let mut candidate = NewInsight::new(content)
        .kind(kind)
        .effectiveness(effectiveness)
        .at(days_ago(age_days));
    for e in entities {
        candidate = candidate.entity(*e);
    }
    engine.add_insight(candidate).unwrap()
}

/// Ids of a layer, in order.
pub fn ids(layer: &[strata::insight::types::Insight]) -> Vec<String> {
    layer.iter().map(|i| i.id.clone()).collect()
}

/// Engine over an existing store, default config, clock pinned to [`test_now`].
pub fn test_engine_on(store: Arc<SqliteStore>) -> InsightEngine {
    InsightEngine::from_config(store, Arc::new(FixedClock(test_now())), &StrataConfig::default())
}
