//! CSV ingest and validation.
//!
//! This module is responsible for turning the raw orders CSV into a clean set
//! of `OrderRecord`s that are safe to aggregate and fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Tolerant rows**: a row that fails numeric/date coercion is dropped,
//!   never silently coerced to zero; what happened is collected per-row
//! - **Deterministic behavior** (no hidden normalization of categoricals)
//! - **Separation of concerns**: no statistics logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::OrderRecord;
use crate::error::AppError;

/// Columns the orders CSV must provide (header names, case-insensitive).
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "order_id",
    "order_date",
    "customer_id",
    "seller_id",
    "category",
    "region",
    "payment_method",
    "price",
    "seller_rating",
    "is_returned",
];

/// Summary stats about the records actually kept.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
}

/// A row-level problem encountered during ingest.
///
/// These rows are excluded from every downstream statistic. They are reported
/// in the run summary but are not errors (tolerant-ETL policy).
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub order_id: Option<String>,
    pub message: String,
}

/// Ingest output: cleaned records + stats + row-level exclusions.
#[derive(Debug, Clone)]
pub struct IngestedOrders {
    pub records: Vec<OrderRecord>,
    /// `None` when every row was dropped.
    pub stats: Option<DatasetStats>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and clean the orders CSV.
///
/// Fails with a `DataLoad` error if the file cannot be read or a required
/// column is missing. Rows that fail coercion are dropped, not fatal; an
/// empty record set is a valid (if useless) result that callers must guard.
pub fn load_orders(path: &Path) -> Result<IngestedOrders, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::data_load(format!("Failed to open orders CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data_load(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    order_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(order) => records.push(order),
            Err((order_id, message)) => row_errors.push(RowError {
                line,
                order_id,
                message,
            }),
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records);

    Ok(IngestedOrders {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿order_id"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::data_load(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

type RowFailure = (Option<String>, String);

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<OrderRecord, RowFailure> {
    let order_id = get_field(record, header_map, "order_id")
        .map(str::to_string)
        .ok_or((None, "Missing `order_id` value.".to_string()))?;

    let fail = |msg: String| (Some(order_id.clone()), msg);

    let order_date = get_field(record, header_map, "order_date")
        .ok_or_else(|| fail("Missing `order_date` value.".to_string()))
        .and_then(|s| parse_date(s).map_err(&fail))?;

    let customer_id = get_required(record, header_map, "customer_id").map_err(&fail)?;
    let seller_id = get_required(record, header_map, "seller_id").map_err(&fail)?;
    let category = get_required(record, header_map, "category").map_err(&fail)?;
    let region = get_required(record, header_map, "region").map_err(&fail)?;
    let payment_method = get_required(record, header_map, "payment_method").map_err(&fail)?;

    // Numeric coercion. A failure here drops the whole row; a bad price must
    // not become 0.0 in the statistics.
    let price = get_field(record, header_map, "price")
        .and_then(parse_f64)
        .ok_or_else(|| fail("Invalid or missing numeric `price`.".to_string()))?;
    let seller_rating = get_field(record, header_map, "seller_rating")
        .and_then(parse_f64)
        .ok_or_else(|| fail("Invalid or missing numeric `seller_rating`.".to_string()))?;

    let is_returned = get_field(record, header_map, "is_returned")
        .and_then(parse_indicator)
        .ok_or_else(|| fail("Invalid `is_returned` (expected 0/1).".to_string()))?;

    Ok(OrderRecord {
        order_id,
        order_date,
        customer_id,
        seller_id,
        category,
        region,
        payment_method,
        price,
        seller_rating,
        is_returned,
    })
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn get_required(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<String, String> {
    get_field(record, header_map, name)
        .map(str::to_string)
        .ok_or_else(|| format!("Missing `{name}` value."))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the recommended format, but order exports in the wild
    // often use day-first or slash-separated variants. We accept a small
    // fixed set to reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_indicator(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ if s.eq_ignore_ascii_case("true") => Some(true),
        _ if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn compute_stats(records: &[OrderRecord]) -> Option<DatasetStats> {
    let first = records.first()?;
    let mut date_min = first.order_date;
    let mut date_max = first.order_date;
    for r in records {
        date_min = date_min.min(r.order_date);
        date_max = date_max.max(r.order_date);
    }
    Some(DatasetStats {
        n_records: records.len(),
        date_min,
        date_max,
    })
}
