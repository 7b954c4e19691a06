use anyhow::Result;

use strata::config::StrataConfig;
use strata::retrieval::crisis::CrisisDetector;
use strata::retrieval::triggers::TriggerRegistry;

/// List the trigger table, or test a piece of text against it.
pub fn triggers(config: &StrataConfig, text: Option<&str>) -> Result<()> {
    let registry = TriggerRegistry::new(config.triggers.clone());

    let Some(text) = text else {
        println!("Triggers");
        println!("{}", "=".repeat(40));
        for t in registry.triggers() {
            println!(
                "  {:<18} cap {}  {}",
                t.entity,
                t.max_surface_insights,
                t.keywords.join(", ")
            );
        }
        return Ok(());
    };

    let detected = registry.detect(text);
    let crisis = CrisisDetector::new(&config.crisis).is_crisis(text);
    if detected.is_empty() {
        println!("Activated: (none)");
    } else {
        println!("Activated: {}", detected.entities.join(", "));
        println!("Keywords:  {}", detected.keywords.join(", "));
    }
    println!("Crisis:    {}", if crisis { "yes" } else { "no" });
    Ok(())
}
