//! Persistence seam for insights.
//!
//! [`InsightStore`] is the interface the engine consumes: bulk scans in
//! insertion order, point lookups, inserts, and supersession links. Two
//! implementations ship: [`SqliteStore`] (durable, audit-logged) and
//! [`InsightArena`] (in-memory arena indexed by id).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, RwLock};

use crate::error::{InsightError, Result};
use crate::insight::types::Insight;

/// Storage interface consumed by the lifecycle manager and the retrieval engine.
///
/// Scans return insights in insertion order; the ranker relies on that order as
/// its final tie-break.
pub trait InsightStore: Send + Sync {
    /// Persist a new insight and return its id. Rejects duplicate ids.
    fn insert(&self, insight: &Insight) -> Result<String>;

    fn get(&self, id: &str) -> Result<Option<Insight>>;

    /// Every insight, superseded ones included.
    fn all_insights(&self) -> Result<Vec<Insight>>;

    /// Insights with no `superseded_by`.
    fn all_active_insights(&self) -> Result<Vec<Insight>> {
        Ok(self
            .all_insights()?
            .into_iter()
            .filter(|i| !i.is_superseded())
            .collect())
    }

    /// Set `old.superseded_by = new_id` and `new.supersedes = old_id` as one step.
    fn link_supersession(&self, old_id: &str, new_id: &str) -> Result<()>;
}

// ── SQLite ───────────────────────────────────────────────────────────────────

/// One row of the `insight_log` audit table.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub created_at: String,
}

/// SQLite-backed store. Writes are serialized behind the connection mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const SELECT_COLUMNS: &str = "SELECT id, content, entities, themes, insight_type, \
     effectiveness_score, timestamp, growth_stage, supersedes, superseded_by, \
     source_file, context FROM insights";

/// Raw column values, decoded into an [`Insight`] outside the rusqlite closure.
struct InsightRow {
    id: String,
    content: String,
    entities: String,
    themes: String,
    insight_type: String,
    effectiveness_score: f64,
    timestamp: String,
    growth_stage: String,
    supersedes: Option<String>,
    superseded_by: Option<String>,
    source_file: Option<String>,
    context: Option<String>,
}

impl InsightRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            entities: row.get(2)?,
            themes: row.get(3)?,
            insight_type: row.get(4)?,
            effectiveness_score: row.get(5)?,
            timestamp: row.get(6)?,
            growth_stage: row.get(7)?,
            supersedes: row.get(8)?,
            superseded_by: row.get(9)?,
            source_file: row.get(10)?,
            context: row.get(11)?,
        })
    }
}

impl TryFrom<InsightRow> for Insight {
    type Error = InsightError;

    fn try_from(row: InsightRow) -> Result<Self> {
        let insight_type = row
            .insight_type
            .parse()
            .map_err(|_| InsightError::Corrupt(format!("{}: bad type {}", row.id, row.insight_type)))?;
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| InsightError::Corrupt(format!("{}: bad timestamp: {e}", row.id)))?
            .with_timezone(&Utc);
        Ok(Insight {
            entities: decode_set(&row.id, &row.entities)?,
            themes: decode_set(&row.id, &row.themes)?,
            id: row.id,
            content: row.content,
            insight_type,
            effectiveness_score: row.effectiveness_score,
            timestamp,
            growth_stage: row.growth_stage,
            supersedes: row.supersedes,
            superseded_by: row.superseded_by,
            source_file: row.source_file,
            context: row.context,
        })
    }
}

fn decode_set(id: &str, json: &str) -> Result<BTreeSet<String>> {
    serde_json::from_str(json)
        .map_err(|e| InsightError::Corrupt(format!("{id}: bad string list: {e}")))
}

fn encode_set(set: &BTreeSet<String>) -> String {
    // A BTreeSet<String> always serializes; the fallback is unreachable in practice
    serde_json::to_string(set).unwrap_or_else(|_| "[]".to_string())
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-write rolls back the open transaction, so the connection is still usable
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn query_insights(&self, sql: &str) -> Result<Vec<Insight>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], InsightRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(Insight::try_from).collect()
    }

    /// Audit log entries for an insight, oldest first.
    pub fn history(&self, insight_id: &str) -> Result<Vec<LogEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT operation, details, created_at FROM insight_log \
             WHERE insight_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![insight_id], |row| {
                let details_str: Option<String> = row.get(1)?;
                Ok(LogEntry {
                    operation: row.get(0)?,
                    details: details_str.and_then(|s| serde_json::from_str(&s).ok()),
                    created_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Size of the database file in bytes, or 0 for in-memory databases.
    pub fn db_size_bytes(&self) -> Result<u64> {
        let conn = self.lock();
        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;
        Ok((page_count * page_size).max(0) as u64)
    }
}

impl InsightStore for SqliteStore {
    fn insert(&self, insight: &Insight) -> Result<String> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM insights WHERE id = ?1",
            params![insight.id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(InsightError::Validation(format!(
                "duplicate insight id: {}",
                insight.id
            )));
        }

        tx.execute(
            "INSERT INTO insights (id, content, entities, themes, insight_type, \
             effectiveness_score, timestamp, growth_stage, supersedes, superseded_by, \
             source_file, context) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                insight.id,
                insight.content,
                encode_set(&insight.entities),
                encode_set(&insight.themes),
                insight.insight_type.as_str(),
                insight.effectiveness_score,
                insight.timestamp.to_rfc3339(),
                insight.growth_stage,
                insight.supersedes,
                insight.superseded_by,
                insight.source_file,
                insight.context,
            ],
        )?;

        write_audit_log(
            &tx,
            "create",
            &insight.id,
            Some(&serde_json::json!({"type": insight.insight_type.as_str()})),
        )?;
        tx.commit()?;

        Ok(insight.id.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Insight>> {
        let conn = self.lock();
        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                InsightRow::from_row,
            )
            .optional()?;
        row.map(Insight::try_from).transpose()
    }

    fn all_insights(&self) -> Result<Vec<Insight>> {
        self.query_insights(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
    }

    fn all_active_insights(&self) -> Result<Vec<Insight>> {
        self.query_insights(&format!(
            "{SELECT_COLUMNS} WHERE superseded_by IS NULL ORDER BY rowid"
        ))
    }

    fn link_supersession(&self, old_id: &str, new_id: &str) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        // both ends must exist before either foreign key is written
        for id in [old_id, new_id] {
            let exists: bool = tx.query_row(
                "SELECT COUNT(*) > 0 FROM insights WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(InsightError::NotFound(id.to_string()));
            }
        }

        tx.execute(
            "UPDATE insights SET superseded_by = ?1 WHERE id = ?2",
            params![new_id, old_id],
        )?;
        tx.execute(
            "UPDATE insights SET supersedes = ?1 WHERE id = ?2",
            params![old_id, new_id],
        )?;

        write_audit_log(
            &tx,
            "supersede",
            old_id,
            Some(&serde_json::json!({"superseded_by": new_id})),
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// Write an entry to the insight_log audit table.
fn write_audit_log(
    tx: &Transaction,
    operation: &str,
    insight_id: &str,
    details: Option<&serde_json::Value>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let details_json = details.map(|d| d.to_string());
    tx.execute(
        "INSERT INTO insight_log (operation, insight_id, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![operation, insight_id, details_json, now],
    )?;
    Ok(())
}

// ── In-memory arena ──────────────────────────────────────────────────────────

/// In-memory store: insights live in a `Vec` (insertion order) with an id index.
/// Supersession edges are plain id links.
#[derive(Default)]
pub struct InsightArena {
    inner: RwLock<Arena>,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Insight>,
    index: HashMap<String, usize>,
}

impl InsightArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Arena> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Arena> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl InsightStore for InsightArena {
    fn insert(&self, insight: &Insight) -> Result<String> {
        let mut arena = self.write();
        if arena.index.contains_key(&insight.id) {
            return Err(InsightError::Validation(format!(
                "duplicate insight id: {}",
                insight.id
            )));
        }
        let slot = arena.slots.len();
        arena.index.insert(insight.id.clone(), slot);
        arena.slots.push(insight.clone());
        Ok(insight.id.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Insight>> {
        let arena = self.read();
        Ok(arena.index.get(id).map(|&slot| arena.slots[slot].clone()))
    }

    fn all_insights(&self) -> Result<Vec<Insight>> {
        Ok(self.read().slots.clone())
    }

    fn link_supersession(&self, old_id: &str, new_id: &str) -> Result<()> {
        let mut arena = self.write();
        let old_slot = *arena
            .index
            .get(old_id)
            .ok_or_else(|| InsightError::NotFound(old_id.to_string()))?;
        let new_slot = *arena
            .index
            .get(new_id)
            .ok_or_else(|| InsightError::NotFound(new_id.to_string()))?;
        arena.slots[old_slot].superseded_by = Some(new_id.to_string());
        arena.slots[new_slot].supersedes = Some(old_id.to_string());
        Ok(())
    }
}
