//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and fitting
//! - exported to CSV/JSON
//! - rendered by a terminal report or a future dashboard front-end

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Minimum order count for a seller to appear in the interactive ranking.
pub const SELLER_MIN_ORDERS: usize = 50;

/// Number of sellers shown in the interactive ranking.
pub const SELLER_TOP_N: usize = 15;

/// Number of sellers written to the seller-rate export.
pub const SELLER_EXPORT_TOP_N: usize = 50;

/// Trailing window length (in populated dates) for the rolling return rate.
pub const ROLLING_WINDOW: usize = 30;

/// One cleaned order row.
///
/// Rows only reach this type after ingest validation: `price` and
/// `seller_rating` parsed as finite numbers, `order_date` parsed as a date,
/// `is_returned` parsed as a 0/1 indicator. Categorical fields are kept
/// verbatim (case-sensitive, no normalization).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub customer_id: String,
    pub seller_id: String,
    pub category: String,
    pub region: String,
    pub payment_method: String,
    pub price: f64,
    pub seller_rating: f64,
    pub is_returned: bool,
}

impl OrderRecord {
    /// The dependent variable as a numeric outcome.
    pub fn outcome(&self) -> f64 {
        if self.is_returned { 1.0 } else { 0.0 }
    }
}

/// Which categorical field to group return rates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Category,
    Region,
    Seller,
}

impl GroupKey {
    /// Human-readable label for terminal output and export headers.
    pub fn display_name(self) -> &'static str {
        match self {
            GroupKey::Category => "category",
            GroupKey::Region => "region",
            GroupKey::Seller => "seller_id",
        }
    }

    /// Extract the grouping value from a record.
    pub fn value_of<'a>(self, record: &'a OrderRecord) -> &'a str {
        match self {
            GroupKey::Category => &record.category,
            GroupKey::Region => &record.region,
            GroupKey::Seller => &record.seller_id,
        }
    }
}

/// Return rate for one value of a grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedRate {
    pub key: String,
    pub orders: usize,
    pub rate: f64,
}

/// Order totals for one calendar date present in the data.
///
/// Dates with no orders do not appear at all; the daily aggregate is a sparse
/// sorted sequence, not a gap-filled calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub total: u64,
    pub returns: u64,
}

/// One point of the rolling return-rate trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// Result of the category-vs-return chi-square independence test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
}

/// One fitted coefficient of the logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
}

/// Full logistic regression fit output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitSummary {
    pub coefficients: Vec<Coefficient>,
    pub log_likelihood: f64,
    pub null_log_likelihood: f64,
    /// McFadden pseudo R-squared: `1 - ll / ll_null`.
    pub pseudo_r_squared: f64,
    pub n_obs: usize,
    pub iterations: usize,
}

/// Exact-match filters for the interactive view.
///
/// `None` means "no filter" on that axis. Filters compose with AND and are
/// applied to the immutable base dataset; they never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub category: Option<String>,
    pub region: Option<String>,
    pub seller: Option<String>,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.region.is_none() && self.seller.is_none()
    }

    /// Whether a record passes every active filter.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        fn ok(value: &str, filter: Option<&str>) -> bool {
            filter.is_none_or(|f| value == f)
        }
        ok(&record.category, self.category.as_deref())
            && ok(&record.region, self.region.as_deref())
            && ok(&record.seller_id, self.seller.as_deref())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    /// Output directory for exports; `None` disables persistence.
    pub out_dir: Option<PathBuf>,
    pub filter: ViewFilter,
}

impl AnalysisConfig {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            out_dir: None,
            filter: ViewFilter::default(),
        }
    }
}
