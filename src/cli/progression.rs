use anyhow::Result;

use strata::config::StrataConfig;
use strata::insight::types::Insight;

/// Show how insights about one entity evolved, oldest third to newest.
pub fn progression(config: &StrataConfig, entity: &str) -> Result<()> {
    let (_, store) = super::open_engine(config)?;
    let p = strata::insight::stats::progression(&*store, entity)?;

    println!("Progression: {}", p.entity);
    println!("{}", "=".repeat(40));
    if p.early.is_empty() && p.middle.is_empty() && p.recent.is_empty() {
        println!("  No active insights for {entity}.");
        return Ok(());
    }

    print_stage("Early", &p.early);
    print_stage("Middle", &p.middle);
    print_stage("Recent", &p.recent);
    Ok(())
}

fn print_stage(name: &str, insights: &[Insight]) {
    println!();
    println!("{name}:");
    for i in insights {
        println!(
            "  {}  {}",
            i.timestamp.format("%Y-%m-%d"),
            super::preview(&i.content, 60)
        );
    }
}
