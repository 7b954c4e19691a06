mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use strata::config::StrataConfig;
use strata::insight::types::InsightType;

#[derive(Parser)]
#[command(name = "strata", version, about = "Layered insight retrieval")]
struct Cli {
    /// Config file (default: ~/.strata/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve insights for a piece of text, in surface / mid / deep layers
    Query {
        text: String,
        /// Deep-layer cap
        #[arg(long = "max")]
        max_insights: Option<usize>,
        /// Also score superseded insights
        #[arg(long)]
        include_superseded: bool,
        /// Print the full result as JSON
        #[arg(long, conflicts_with = "conversation")]
        json: bool,
        /// Print only the conversation-ready rendering of the surface layer
        #[arg(long)]
        conversation: bool,
    },
    /// Store a new insight
    Add {
        content: String,
        /// Entity tag (repeatable)
        #[arg(long = "entity")]
        entities: Vec<String>,
        /// Theme tag (repeatable)
        #[arg(long = "theme")]
        themes: Vec<String>,
        /// anchor | breakthrough | strategy | observation (detected when omitted)
        #[arg(long = "type")]
        insight_type: Option<String>,
        /// 0.0 to 1.0 (assessed from content when omitted)
        #[arg(long)]
        effectiveness: Option<f64>,
        #[arg(long)]
        growth_stage: Option<String>,
        /// File the insight was extracted from
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Mark an insight as replaced by a newer one
    Supersede { old_id: String, new_id: String },
    /// Show one insight with its revision chain and audit log
    Inspect { id: String },
    /// Store statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Early / middle / recent insights for one entity
    Progression { entity: String },
    /// List triggers, or show which ones a text activates
    Triggers { text: Option<String> },
    /// Export all insights as JSON to stdout
    Export,
    /// Import insights from an exported JSON file
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => StrataConfig::load_from(path)?,
        None => StrataConfig::load()?,
    };

    // Log to stderr so stdout stays clean for JSON output.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Query {
            text,
            max_insights,
            include_superseded,
            json,
            conversation,
        } => cli::query::query(
            &config,
            cli::query::QueryArgs {
                text: &text,
                max_insights,
                include_superseded,
                json,
                conversation,
            },
        )?,
        Command::Add {
            content,
            entities,
            themes,
            insight_type,
            effectiveness,
            growth_stage,
            source,
            context,
        } => {
            let insight_type = insight_type
                .map(|t| t.parse::<InsightType>())
                .transpose()?;
            cli::add::add(
                &config,
                cli::add::AddArgs {
                    content,
                    entities,
                    themes,
                    insight_type,
                    effectiveness,
                    growth_stage,
                    source,
                    context,
                },
            )?
        }
        Command::Supersede { old_id, new_id } => cli::supersede::supersede(&config, &old_id, &new_id)?,
        Command::Inspect { id } => cli::inspect::inspect(&config, &id)?,
        Command::Stats { json } => cli::stats::stats(&config, json)?,
        Command::Progression { entity } => cli::progression::progression(&config, &entity)?,
        Command::Triggers { text } => cli::triggers::triggers(&config, text.as_deref())?,
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
    }

    Ok(())
}
