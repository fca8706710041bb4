//! Asset Budget CLI
//!
//! Runs a budget projection over an asset CSV and prints the yearly table

use anyhow::{Context, Result};
use asset_budget::asset::load_assets;
use asset_budget::config::MAX_HORIZON_YEARS;
use asset_budget::projection::{
    write_attention_csv, write_projections_csv, BudgetProjector, CostAssumptions, ProjectionConfig,
    ReplacementPolicy,
};
use chrono::Datelike;
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "budget_projection", version, about = "Project maintenance and replacement budgets")]
struct Args {
    /// Asset CSV (id,name,type,status,value,condition,purchase_date,expected_lifespan)
    #[arg(long, default_value = "data/assets.csv")]
    assets: PathBuf,

    /// Number of years to project
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=MAX_HORIZON_YEARS as i64))]
    years: u32,

    /// First projected year (defaults to the current year)
    #[arg(long)]
    start_year: Option<i32>,

    /// Write the yearly table as CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write one CSV row per asset requiring attention
    #[arg(long)]
    attention_output: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Count each replacement only in the first year it falls due
    #[arg(long)]
    first_due_only: bool,
}

/// Projection window and policy from the command line
fn projection_config(args: &Args) -> Result<ProjectionConfig> {
    let config = ProjectionConfig {
        start_year: args.start_year.unwrap_or_else(|| chrono::Local::now().year()),
        horizon_years: args.years,
        replacement_policy: ReplacementPolicy::from_first_due_only(args.first_due_only),
    };
    config.validate().context("invalid --start-year")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = projection_config(&args)?;
    let start_year = config.start_year;

    let assets = load_assets(&args.assets)
        .with_context(|| format!("failed to load assets from {}", args.assets.display()))?;
    log::info!("loaded {} assets", assets.len());

    let projector = BudgetProjector::new(CostAssumptions::standard(), config);
    let result = projector.project(&assets);
    let summary = result.summary();

    if args.json {
        let body = serde_json::json!({
            "projections": result.years,
            "total_assets": result.total_assets,
            "projection_years": result.horizon_years,
            "start_year": result.start_year,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Budget Projection: {} assets, {} years from {}", result.total_assets, result.horizon_years, start_year);
        println!();
        println!("{:>6} {:>16} {:>16} {:>16} {:>10}", "Year", "Maintenance", "Replacement", "Total", "Attention");
        println!("{}", "-".repeat(68));

        for y in &result.years {
            println!(
                "{:>6} {:>16.2} {:>16.2} {:>16.2} {:>10}",
                y.year,
                y.maintenance_cost,
                y.replacement_cost,
                y.total_budget_needed,
                y.assets_requiring_attention.len(),
            );
        }

        println!("\nSummary:");
        println!("  Total Maintenance: ${:.2}", summary.total_maintenance);
        println!("  Total Replacement: ${:.2}", summary.total_replacement);
        println!("  Total Budget Needed: ${:.2}", summary.total_budget_needed);
        if let Some(peak) = summary.peak_year {
            println!("  Peak Year: {} (${:.2})", peak, summary.peak_budget_needed);
        }
        println!("  Assets Due for Replacement: {}", summary.assets_due_for_replacement);
    }

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
        write_projections_csv(file, &result.years)?;
        eprintln!("Yearly projections written to: {}", path.display());
    }

    if let Some(path) = &args.attention_output {
        let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
        write_attention_csv(file, &result.years)?;
        eprintln!("Attention list written to: {}", path.display());
    }

    Ok(())
}
