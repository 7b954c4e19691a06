//! CLI `add` command: store a new insight.

use anyhow::Result;

use strata::config::StrataConfig;
use strata::insight::store::InsightStore;
use strata::insight::types::{InsightType, NewInsight};

pub struct AddArgs {
    pub content: String,
    pub entities: Vec<String>,
    pub themes: Vec<String>,
    pub insight_type: Option<InsightType>,
    pub effectiveness: Option<f64>,
    pub growth_stage: Option<String>,
    pub source: Option<String>,
    pub context: Option<String>,
}

pub fn add(config: &StrataConfig, args: AddArgs) -> Result<()> {
    let (engine, store) = super::open_engine(config)?;

    let candidate = NewInsight {
        content: args.content,
        entities: args.entities,
        themes: args.themes,
        insight_type: args.insight_type,
        effectiveness_score: args.effectiveness,
        growth_stage: args.growth_stage,
        source_file: args.source,
        context: args.context,
        ..NewInsight::default()
    };

    let id = engine.add_insight(candidate)?;

    match store.get(&id)? {
        Some(insight) => println!(
            "Stored {} ({}, effectiveness {:.2})",
            insight.id, insight.insight_type, insight.effectiveness_score
        ),
        None => println!("Stored {id}"),
    }
    Ok(())
}
