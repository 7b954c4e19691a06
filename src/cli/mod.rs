pub mod add;
pub mod export;
pub mod import;
pub mod inspect;
pub mod progression;
pub mod query;
pub mod stats;
pub mod supersede;
pub mod triggers;

use anyhow::Result;
use std::sync::Arc;

use strata::clock::SystemClock;
use strata::config::StrataConfig;
use strata::insight::store::SqliteStore;
use strata::retrieval::InsightEngine;

/// Open the configured database and build an engine over it.
///
/// The store handle is returned too, for the audit-log and size queries that
/// only the SQLite store offers.
pub fn open_engine(config: &StrataConfig) -> Result<(InsightEngine, Arc<SqliteStore>)> {
    let db_path = config.resolved_db_path();
    let conn = strata::db::open_database(&db_path)?;
    let store = Arc::new(SqliteStore::new(conn));
    let engine = InsightEngine::from_config(store.clone(), Arc::new(SystemClock), config);
    Ok((engine, store))
}

/// One-line preview of insight content for listings.
pub fn preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
