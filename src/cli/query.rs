//! CLI `query` command: layered retrieval for a piece of text.

use anyhow::Result;

use strata::config::StrataConfig;
use strata::insight::types::Insight;
use strata::retrieval::format::format_for_conversation;
use strata::retrieval::RetrieveOptions;

pub struct QueryArgs<'a> {
    pub text: &'a str,
    pub max_insights: Option<usize>,
    pub include_superseded: bool,
    pub json: bool,
    pub conversation: bool,
}

pub fn query(config: &StrataConfig, args: QueryArgs<'_>) -> Result<()> {
    let (engine, _) = super::open_engine(config)?;

    let result = engine.retrieve_with(
        args.text,
        RetrieveOptions {
            max_insights: args.max_insights,
            include_superseded: args.include_superseded,
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if args.conversation {
        println!("{}", format_for_conversation(&result));
        return Ok(());
    }

    if result.crisis_mode {
        println!("CRISIS MODE");
    }
    if result.triggers_activated.is_empty() {
        println!("Triggers: (none)");
    } else {
        println!(
            "Triggers: {} (keywords: {})",
            result.triggers_activated.join(", "),
            result.matched_keywords.join(", ")
        );
    }

    print_layer("Surface", &result.surface);
    print_layer("Mid", &result.mid);
    print_layer("Deep", &result.deep);

    Ok(())
}

fn print_layer(name: &str, insights: &[Insight]) {
    println!();
    println!("{name} ({})", insights.len());
    println!("{}", "-".repeat(40));
    for i in insights {
        println!(
            "  [{:<12}] {:.2}  {}  {}",
            i.insight_type.as_str(),
            i.effectiveness_score,
            i.id,
            super::preview(&i.content, 60)
        );
    }
}
