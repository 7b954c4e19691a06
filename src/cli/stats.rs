use anyhow::Result;

use strata::config::StrataConfig;
use strata::insight::types::InsightType;

/// Display insight statistics in the terminal.
pub fn stats(config: &StrataConfig, json: bool) -> Result<()> {
    let (_, store) = super::open_engine(config)?;

    let response = strata::insight::stats::store_stats(&*store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Insight Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total insights:      {}", response.total_insights);
    println!("  Active:              {}", response.active_insights);
    println!("  Superseded:          {}", response.superseded_insights);
    println!();

    println!("By Type:");
    for t in InsightType::ALL {
        let count = response.by_type.get(t.as_str()).copied().unwrap_or(0);
        println!("  {:<14} {}", t.as_str(), count);
    }
    println!();

    if !response.entities.is_empty() {
        println!("By Entity:");
        for e in &response.entities {
            let latest = e
                .latest
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!("  {:<18} {:>4}  latest {}", e.entity, e.count, latest);
        }
        println!();
    }

    println!("Database size:         {} bytes", store.db_size_bytes()?);

    if let Some(oldest) = response.oldest_insight {
        println!("Oldest insight:        {}", oldest.to_rfc3339());
    }
    if let Some(newest) = response.newest_insight {
        println!("Newest insight:        {}", newest.to_rfc3339());
    }

    Ok(())
}
