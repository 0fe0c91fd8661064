//! Persisted analysis outputs.
//!
//! Each artifact is independent and order-insensitive: grouped-rate CSVs,
//! the chi-square result as JSON, and the regression summary as a text
//! report. Files are written fully and closed on every exit path; a failure
//! maps to an `Export` error naming the artifact.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{ChiSquareResult, GroupedRate, LogitSummary, SELLER_EXPORT_TOP_N};
use crate::error::AppError;
use crate::report::format_logit_summary;

pub const CATEGORY_RATES_FILE: &str = "return_rate_by_category.csv";
pub const REGION_RATES_FILE: &str = "return_rate_by_region.csv";
pub const SELLER_RATES_FILE: &str = "return_rate_by_seller_top50.csv";
pub const CHI_SQUARE_FILE: &str = "chi_square_category_return.json";
pub const REGRESSION_FILE: &str = "logistic_regression_summary.txt";

/// Ensure the output directory exists.
pub fn prepare_out_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::export(format!("Failed to create output dir '{}': {e}", dir.display())))
}

/// Write one grouped-rate table as `<key_label>,orders,return_rate`.
pub fn write_grouped_rates_csv(
    path: &Path,
    key_label: &str,
    rates: &[GroupedRate],
) -> Result<(), AppError> {
    let mut file = create(path)?;

    writeln!(file, "{key_label},orders,return_rate")
        .map_err(|e| write_err(path, e))?;
    for g in rates {
        writeln!(file, "{},{},{:.10}", g.key, g.orders, g.rate).map_err(|e| write_err(path, e))?;
    }
    Ok(())
}

/// Write the seller table truncated to the export cap.
pub fn write_seller_rates_csv(path: &Path, rates: &[GroupedRate]) -> Result<(), AppError> {
    let top: Vec<GroupedRate> = rates.iter().take(SELLER_EXPORT_TOP_N).cloned().collect();
    write_grouped_rates_csv(path, "seller_id", &top)
}

/// Write the chi-square result as a structured JSON record.
pub fn write_chi_square_json(path: &Path, result: &ChiSquareResult) -> Result<(), AppError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::export(format!("Failed to write '{}': {e}", path.display())))
}

/// Write the regression summary as a human-readable text report.
pub fn write_regression_summary(path: &Path, summary: &LogitSummary) -> Result<(), AppError> {
    let mut file = create(path)?;
    file.write_all(format_logit_summary(summary).as_bytes())
        .map_err(|e| write_err(path, e))
}

/// Resolve an artifact path inside the output directory.
pub fn artifact_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(file)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create '{}': {e}", path.display())))
}

fn write_err(path: &Path, e: std::io::Error) -> AppError {
    AppError::export(format!("Failed to write '{}': {e}", path.display()))
}
