use anyhow::Result;
use serde::{Deserialize, Serialize};

use strata::config::StrataConfig;
use strata::insight::store::InsightStore;
use strata::insight::types::Insight;

/// Export format: every insight, superseded ones included, in insertion order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub insights: Vec<Insight>,
}

/// Export all insights as JSON to stdout.
pub fn export(config: &StrataConfig) -> Result<()> {
    let (_, store) = super::open_engine(config)?;

    let data = ExportData {
        insights: store.all_insights()?,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    let links = data
        .insights
        .iter()
        .filter(|i| i.superseded_by.is_some())
        .count();
    eprintln!(
        "Exported {} insights and {} supersession links.",
        data.insights.len(),
        links
    );

    Ok(())
}
