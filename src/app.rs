//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and cleans the orders CSV
//! - runs aggregation, the association test, and the regression
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{AnalyzeArgs, Command, RatesArgs, SampleArgs, TrendArgs};
use crate::domain::{AnalysisConfig, ViewFilter};
use crate::error::AppError;
use crate::io::export;

pub mod pipeline;

/// Entry point for the `ra` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Rates(args) => handle_rates(args),
        Command::Trend(args) => handle_trend(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run.ingest, &run.snapshot));
    println!("{}", crate::report::format_grouped_rates("By category", &run.snapshot.by_category));
    println!("{}", crate::report::format_grouped_rates("By region", &run.snapshot.by_region));
    println!(
        "{}",
        crate::report::format_grouped_rates(
            "Top 15 sellers by return rate (min 50 orders)",
            &run.snapshot.seller_ranking
        )
    );
    println!("{}", crate::report::format_chi_square(&run.chi_square));
    println!("{}", crate::report::format_regression(&run.regression));

    if args.trend {
        println!("{}", crate::report::format_rolling_trend(&run.snapshot.rolling_trend));
    }

    if let Some(dir) = &config.out_dir {
        write_exports(dir, &run)?;
        println!("Exports written to '{}'.", dir.display());
    }

    Ok(())
}

fn write_exports(dir: &std::path::Path, run: &pipeline::RunOutput) -> Result<(), AppError> {
    export::prepare_out_dir(dir)?;
    export::write_grouped_rates_csv(
        &export::artifact_path(dir, export::CATEGORY_RATES_FILE),
        "category",
        &run.snapshot.by_category,
    )?;
    export::write_grouped_rates_csv(
        &export::artifact_path(dir, export::REGION_RATES_FILE),
        "region",
        &run.snapshot.by_region,
    )?;
    export::write_seller_rates_csv(
        &export::artifact_path(dir, export::SELLER_RATES_FILE),
        &run.by_seller,
    )?;
    export::write_chi_square_json(
        &export::artifact_path(dir, export::CHI_SQUARE_FILE),
        &run.chi_square,
    )?;
    // The regression summary is only persisted when the stage succeeded;
    // its failure was already reported in the terminal output.
    if let Ok(summary) = &run.regression {
        export::write_regression_summary(
            &export::artifact_path(dir, export::REGRESSION_FILE),
            summary,
        )?;
    }
    Ok(())
}

fn handle_rates(args: RatesArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_orders(&args.data.data)?;
    let filter = filter_from_args(&args.data);
    let subset: Vec<_> = ingest
        .records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    let rates = crate::stats::aggregate::grouped_rates(&subset, args.by);
    let title = format!("Return rate by {}", args.by.display_name());
    println!("{}", crate::report::format_grouped_rates(&title, &rates));
    Ok(())
}

fn handle_trend(args: TrendArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_orders(&args.data.data)?;
    let filter = filter_from_args(&args.data);
    let subset: Vec<_> = ingest
        .records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();

    let daily = crate::stats::aggregate::daily_aggregate(&subset);
    let trend = crate::stats::rolling::rolling_rate(&daily, crate::domain::ROLLING_WINDOW);
    println!("{}", crate::report::format_rolling_trend(&trend));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        rows: args.rows,
        seed: args.seed,
        start_date: args.start_date,
        days: args.days,
    };
    let records = crate::data::generate_orders(&config)?;
    crate::data::write_orders_csv(&args.out, &records)?;
    println!(
        "Wrote {} synthetic orders to '{}' (seed {}).",
        records.len(),
        args.out.display(),
        args.seed
    );
    Ok(())
}

fn filter_from_args(args: &crate::cli::DataArgs) -> ViewFilter {
    ViewFilter {
        category: args.category.clone(),
        region: args.region.clone(),
        seller: args.seller.clone(),
    }
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> AnalysisConfig {
    let mut config = AnalysisConfig::new(args.data.data.clone());
    config.out_dir = args.out.clone();
    config.filter = filter_from_args(&args.data);
    config
}
