// ==============================================================================
// main.rs - Ancestry Engine Entry Point
// ==============================================================================
// Description: Command-line entry point for ancestry inference on raw DNA
//              exports
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ancestry_engine::marker_panel::MarkerPanel;
use ancestry_engine::models::ScoringConfig;
use ancestry_engine::populations::PopulationRegistry;
use ancestry_engine::processor::AncestryProcessor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raw DNA export to analyze (.txt, .csv, or .gz)
    input: PathBuf,

    /// Write the result JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Marker panel JSON file (defaults to the built-in panel)
    #[arg(short, long, env = "ANCESTRY_PANEL")]
    panel: Option<PathBuf>,

    /// Minimum matched markers before results are flagged low-confidence
    #[arg(long, default_value_t = 10)]
    min_markers: usize,

    /// Minimum scored markers for a population to enter the breakdown
    #[arg(long, default_value_t = 10)]
    min_population_markers: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ancestry_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Ancestry Engine starting...");

    let args = Args::parse();

    let panel = match &args.panel {
        Some(path) => MarkerPanel::from_json_file(path)
            .with_context(|| format!("Failed to load marker panel from {:?}", path))?,
        None => MarkerPanel::builtin(),
    };
    info!("Marker panel loaded: {} markers", panel.len());

    let config = ScoringConfig {
        min_panel_markers: args.min_markers,
        min_population_markers: args.min_population_markers,
        ..ScoringConfig::default()
    };

    let processor = AncestryProcessor::new(
        args.input,
        args.output.clone(),
        panel,
        PopulationRegistry::builtin(),
        config,
    );

    let result = processor.process().await?;

    if args.output.is_none() {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
