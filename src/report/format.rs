//! Formatted terminal output for analysis runs.
//!
//! We keep formatting code in one place so:
//! - the statistics/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! Empty results render explicit fallback lines ("Not enough data...",
//! "No data...") instead of empty tables; that contract is part of the
//! display semantics, not cosmetics.

use crate::domain::{ChiSquareResult, GroupedRate, LogitSummary, RollingPoint};
use crate::error::AppError;
use crate::io::ingest::IngestedOrders;
use crate::view::ViewSnapshot;

/// Format the KPI block plus ingest summary for the current view.
pub fn format_run_summary(ingest: &IngestedOrders, snapshot: &ViewSnapshot) -> String {
    let mut out = String::new();

    out.push_str("=== ra - Return Rate Analysis ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    if let Some(stats) = &ingest.stats {
        out.push_str(&format!(
            "Dates: {} .. {}\n",
            stats.date_min, stats.date_max
        ));
    }
    if !snapshot.filter.is_empty() {
        let mut parts = Vec::new();
        if let Some(c) = &snapshot.filter.category {
            parts.push(format!("category={c}"));
        }
        if let Some(r) = &snapshot.filter.region {
            parts.push(format!("region={r}"));
        }
        if let Some(s) = &snapshot.filter.seller {
            parts.push(format!("seller={s}"));
        }
        out.push_str(&format!("Filters: {}\n", parts.join(" ")));
    }

    if snapshot.is_empty() {
        out.push_str("\nNo data for the selected filters.\n");
        return out;
    }

    out.push_str(&format!(
        "\nOverall return rate: {:.2}%\n",
        snapshot.overall_rate * 100.0
    ));
    out.push_str(&format!("Total orders: {}\n", snapshot.total_orders));
    out.push_str(&format!("Unique sellers: {}\n", snapshot.distinct_sellers));
    out.push_str(&format!("Unique customers: {}\n", snapshot.distinct_customers));

    out
}

/// Format one grouped-rate table.
pub fn format_grouped_rates(title: &str, rates: &[GroupedRate]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));
    if rates.is_empty() {
        out.push_str("  Not enough data after filters.\n");
        return out;
    }

    out.push_str(&format!("  {:<24} {:>8} {:>10}\n", "key", "orders", "rate"));
    for g in rates {
        out.push_str(&format!(
            "  {:<24} {:>8} {:>9.2}%\n",
            truncate(&g.key, 24),
            g.orders,
            g.rate * 100.0
        ));
    }
    out
}

/// Format the chi-square diagnostic line.
pub fn format_chi_square(result: &ChiSquareResult) -> String {
    format!(
        "Chi-square (category x return): chi2={:.4} p={:.4} dof={}\n",
        result.statistic, result.p_value, result.dof
    )
}

/// Format the regression outcome: either the coefficient table or the
/// stage-local failure, per the partial-failure policy.
pub fn format_regression(outcome: &Result<LogitSummary, AppError>) -> String {
    match outcome {
        Ok(summary) => format_logit_summary(summary),
        Err(err) => format!("Logistic regression: skipped ({err})\n"),
    }
}

/// Format the fitted model as a coefficient table plus fit statistics.
pub fn format_logit_summary(summary: &LogitSummary) -> String {
    let mut out = String::new();
    out.push_str("Logistic regression: is_returned ~ price + seller_rating + category + region + payment_method\n");
    out.push_str(&format!(
        "  n={} iterations={} log-likelihood={:.4} ll-null={:.4} pseudo-R2={:.4}\n",
        summary.n_obs,
        summary.iterations,
        summary.log_likelihood,
        summary.null_log_likelihood,
        summary.pseudo_r_squared
    ));

    out.push_str(&format!(
        "  {:<28} {:>12} {:>12} {:>9} {:>9}\n",
        "term", "coef", "std err", "z", "P>|z|"
    ));
    for c in &summary.coefficients {
        out.push_str(&format!(
            "  {:<28} {:>12.6} {:>12.6} {:>9.3} {:>9.4}\n",
            truncate(&c.name, 28),
            c.estimate,
            c.std_error,
            c.z_value,
            c.p_value
        ));
    }
    out
}

/// Format the rolling trend series for terminal output.
pub fn format_rolling_trend(trend: &[RollingPoint]) -> String {
    let mut out = String::new();
    out.push_str("30-entry rolling return rate:\n");
    if trend.is_empty() {
        out.push_str("  No data for selected filters.\n");
        return out;
    }
    for point in trend {
        out.push_str(&format!("  {} {:>7.4}\n", point.date, point.rate));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}
