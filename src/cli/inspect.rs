//! CLI `inspect` command: display full details for a single insight.

use anyhow::{Context, Result};

use strata::config::StrataConfig;
use strata::insight::lifecycle;
use strata::insight::store::InsightStore;

/// Inspect an insight by ID: fields, revision chain, and audit log.
pub fn inspect(config: &StrataConfig, id: &str) -> Result<()> {
    let (_, store) = super::open_engine(config)?;

    let insight = store
        .get(id)?
        .with_context(|| format!("no insight with id {id}"))?;

    println!("Insight: {}", insight.id);
    println!("{}", "=".repeat(50));
    println!("  Type:           {}", insight.insight_type);
    println!("  Effectiveness:  {:.2}", insight.effectiveness_score);
    println!("  Timestamp:      {}", insight.timestamp.to_rfc3339());
    println!("  Growth stage:   {}", insight.growth_stage);
    if !insight.entities.is_empty() {
        let entities: Vec<&str> = insight.entities.iter().map(String::as_str).collect();
        println!("  Entities:       {}", entities.join(", "));
    }
    if !insight.themes.is_empty() {
        let themes: Vec<&str> = insight.themes.iter().map(String::as_str).collect();
        println!("  Themes:         {}", themes.join(", "));
    }
    if let Some(ref s) = insight.supersedes {
        println!("  Supersedes:     {s}");
    }
    if let Some(ref sb) = insight.superseded_by {
        println!("  Superseded by:  {sb}");
    }
    if let Some(ref source) = insight.source_file {
        println!("  Source:         {source}");
    }
    println!();
    println!("Content:");
    println!("  {}", insight.content);
    if let Some(ref context) = insight.context {
        println!();
        println!("Context:");
        println!("  {context}");
    }

    let chain = lifecycle::chain(&*store, id)?;
    if chain.len() > 1 {
        println!();
        println!("Revision Chain (oldest first):");
        for (n, rev) in chain.iter().enumerate() {
            let marker = if rev.id == insight.id { "*" } else { " " };
            println!(
                " {marker}{}. {}  {}",
                n + 1,
                rev.id,
                super::preview(&rev.content, 50)
            );
        }
    }

    let log = store.history(id)?;
    if !log.is_empty() {
        println!();
        println!("Audit Log:");
        for entry in log {
            let details = entry
                .details
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default();
            println!("  {} [{}] {}", entry.created_at, entry.operation, details);
        }
    }

    Ok(())
}
