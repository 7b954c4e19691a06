use anyhow::{Context, Result};
use std::path::Path;

use strata::config::StrataConfig;
use strata::error::InsightError;
use strata::insight::store::InsightStore;
use strata::insight::types::{Insight, NewInsight};

use super::export::ExportData;

/// Import insights from a JSON file produced by `export`.
///
/// Insights whose ID already exists are skipped. Supersession links are
/// replayed afterwards when both endpoints exist.
pub fn import(config: &StrataConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let (engine, store) = super::open_engine(config)?;

    let mut imported = 0u64;
    let mut skipped = 0u64;

    println!("Importing {} insights...", data.insights.len());

    for insight in &data.insights {
        if store.get(&insight.id)?.is_some() {
            skipped += 1;
            continue;
        }
        engine.add_insight(as_candidate(insight))?;
        imported += 1;
    }

    let mut links = 0u64;
    for insight in &data.insights {
        let Some(ref new_id) = insight.superseded_by else {
            continue;
        };
        match engine.supersede(&insight.id, new_id) {
            Ok(()) => links += 1,
            Err(InsightError::NotFound(missing)) => {
                tracing::warn!(old = %insight.id, new = %new_id, %missing, "link endpoint missing, skipped");
            }
            Err(e @ (InsightError::Validation(_) | InsightError::Cycle { .. })) => {
                tracing::warn!(old = %insight.id, new = %new_id, error = %e, "link rejected, skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "Import complete: {imported} imported, {skipped} skipped (already exist), {links} links replayed."
    );
    Ok(())
}

/// Rebuild a write candidate that preserves the exported id, type, score and time.
fn as_candidate(insight: &Insight) -> NewInsight {
    NewInsight {
        content: insight.content.clone(),
        entities: insight.entities.iter().cloned().collect(),
        themes: insight.themes.iter().cloned().collect(),
        insight_type: Some(insight.insight_type),
        effectiveness_score: Some(insight.effectiveness_score),
        growth_stage: Some(insight.growth_stage.clone()),
        source_file: insight.source_file.clone(),
        context: insight.context.clone(),
        id: Some(insight.id.clone()),
        timestamp: Some(insight.timestamp),
    }
}
