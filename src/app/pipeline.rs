//! Shared analysis pipeline used by the CLI (and any future front-end).
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> filter -> aggregate -> association test -> regression -> report.
//!
//! The regression stage is captured per-run rather than propagated: a
//! `SingularDesignMatrix` or `NonConvergence` failure aborts only that stage,
//! and the run still carries every statistic that did succeed.

use crate::domain::{AnalysisConfig, GroupKey, GroupedRate, ChiSquareResult, LogitSummary, OrderRecord};
use crate::error::AppError;
use crate::io::ingest::{IngestedOrders, load_orders};
use crate::model::{build_design_matrix, fit_logit};
use crate::stats::aggregate;
use crate::stats::contingency::{ContingencyTable, chi_square_test};
use crate::view::ViewSnapshot;

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedOrders,
    /// KPIs, grouped rates, ranking, and trend for the configured filter.
    pub snapshot: ViewSnapshot,
    /// Full per-seller grouping (uncapped, unthresholded) for the export.
    pub by_seller: Vec<GroupedRate>,
    pub chi_square: ChiSquareResult,
    /// Stage-local outcome: an `Err` here never fails the run.
    pub regression: Result<LogitSummary, AppError>,
}

/// Execute the full pipeline, loading the source from disk.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let ingest = load_orders(&config.data_path)?;
    run_analysis_with_orders(config, ingest)
}

/// Execute the pipeline with an already-loaded dataset.
///
/// This is the only caching the design permits: an interactive caller keeps
/// the ingest result and recomputes filtered views from it without
/// re-reading the source. Filtered subsets themselves are never cached.
pub fn run_analysis_with_orders(
    config: &AnalysisConfig,
    ingest: IngestedOrders,
) -> Result<RunOutput, AppError> {
    let subset: Vec<OrderRecord> = ingest
        .records
        .iter()
        .filter(|r| config.filter.matches(r))
        .cloned()
        .collect();

    let snapshot = ViewSnapshot::compute(&ingest.records, &config.filter);
    let by_seller = aggregate::grouped_rates(&subset, GroupKey::Seller);

    let table = ContingencyTable::from_records(&subset);
    let chi_square = chi_square_test(&table);

    // Captured, not propagated: see module docs.
    let regression = build_design_matrix(&subset).and_then(|design| fit_logit(&design));

    Ok(RunOutput {
        ingest,
        snapshot,
        by_seller,
        chi_square,
        regression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ViewFilter;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn ingested(records: Vec<OrderRecord>) -> IngestedOrders {
        let rows = records.len();
        IngestedOrders {
            records,
            stats: None,
            row_errors: Vec::new(),
            rows_read: rows,
            rows_used: rows,
        }
    }

    fn order(
        id: usize,
        category: &str,
        region: &str,
        payment: &str,
        price: f64,
        rating: f64,
        returned: bool,
    ) -> OrderRecord {
        OrderRecord {
            order_id: format!("O{id}"),
            order_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                + chrono::Days::new((id % 40) as u64),
            customer_id: format!("C{id}"),
            seller_id: format!("S{}", id % 3),
            category: category.to_string(),
            region: region.to_string(),
            payment_method: payment.to_string(),
            price,
            seller_rating: rating,
            is_returned: returned,
        }
    }

    fn varied_records() -> Vec<OrderRecord> {
        let mut records = Vec::new();
        for i in 0..60 {
            let category = if i % 2 == 0 { "Books" } else { "Toys" };
            let region = if i % 3 == 0 { "East" } else { "West" };
            let payment = if i % 5 == 0 { "COD" } else { "UPI" };
            let price = 5.0 + (i as f64) * 1.7;
            let rating = 3.0 + ((i % 20) as f64) / 10.0;
            // Mixed across every categorical level so no predictor
            // perfectly separates the outcome.
            let returned = i % 7 == 0 || i % 10 == 3;
            records.push(order(i, category, region, payment, price, rating, returned));
        }
        records
    }

    #[test]
    fn unfiltered_run_produces_every_stage() {
        let config = AnalysisConfig::new("unused.csv".into());
        let run = run_analysis_with_orders(&config, ingested(varied_records())).unwrap();

        assert_eq!(run.snapshot.total_orders, 60);
        assert!(run.chi_square.statistic.is_finite());
        assert_eq!(run.chi_square.dof, 1);
        let summary = run.regression.unwrap();
        assert_eq!(summary.coefficients[0].name, "const");
        assert!(summary.coefficients.iter().any(|c| c.name == "category[Toys]"));
    }

    /// Spec scenario: a single-level predictor in the filtered subset fails
    /// the regression stage, while aggregation and the association test
    /// still produce valid output from the same subset.
    #[test]
    fn regression_failure_does_not_abort_the_run() {
        // Filtering to one region leaves `region` with a single level.
        let mut config = AnalysisConfig::new("unused.csv".into());
        config.filter = ViewFilter {
            region: Some("East".to_string()),
            ..ViewFilter::default()
        };

        let run = run_analysis_with_orders(&config, ingested(varied_records())).unwrap();

        assert!(run.snapshot.total_orders > 0);
        assert!(run.chi_square.statistic.is_finite());
        let err = run.regression.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SingularDesignMatrix);
    }

    #[test]
    fn seller_export_grouping_ignores_ranking_threshold() {
        let config = AnalysisConfig::new("unused.csv".into());
        let run = run_analysis_with_orders(&config, ingested(varied_records())).unwrap();

        // Three sellers with 20 orders each: none clears the >= 50 ranking
        // threshold, but all appear in the export grouping.
        assert!(run.snapshot.seller_ranking.is_empty());
        assert_eq!(run.by_seller.len(), 3);
    }

    #[test]
    fn end_to_end_from_generated_csv_with_exports() {
        let tmp = std::env::temp_dir().join(format!("ra-e2e-{}", std::process::id()));
        std::fs::create_dir_all(&tmp).unwrap();
        let csv = tmp.join("orders.csv");

        let records = crate::data::generate_orders(&crate::data::SampleConfig {
            rows: 2000,
            ..crate::data::SampleConfig::default()
        })
        .unwrap();
        crate::data::write_orders_csv(&csv, &records).unwrap();

        let mut config = AnalysisConfig::new(csv);
        config.out_dir = Some(tmp.clone());
        let run = run_analysis(&config).unwrap();

        assert_eq!(run.ingest.rows_used, 2000);
        assert!(run.ingest.row_errors.is_empty());
        assert!(run.regression.is_ok());

        crate::app::write_exports(&tmp, &run).unwrap();
        for file in [
            crate::io::export::CATEGORY_RATES_FILE,
            crate::io::export::REGION_RATES_FILE,
            crate::io::export::SELLER_RATES_FILE,
            crate::io::export::CHI_SQUARE_FILE,
            crate::io::export::REGRESSION_FILE,
        ] {
            assert!(tmp.join(file).exists(), "missing export {file}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn chi_square_and_regression_use_the_filtered_subset() {
        let mut config = AnalysisConfig::new("unused.csv".into());
        config.filter = ViewFilter {
            category: Some("Books".to_string()),
            ..ViewFilter::default()
        };
        let run = run_analysis_with_orders(&config, ingested(varied_records())).unwrap();

        // One category left: the contingency table degenerates to dof 0.
        assert_eq!(run.chi_square.dof, 0);
        // And the regression fails on the single-level `category` predictor.
        assert_eq!(
            run.regression.unwrap_err().kind(),
            ErrorKind::SingularDesignMatrix
        );
    }
}
