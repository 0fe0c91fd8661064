//! Filtered-view support for an interactive front-end.
//!
//! A `ViewSnapshot` is everything a dashboard needs for one filter state:
//! KPIs, grouped rates, the seller ranking, and the rolling trend. It is a
//! pure function of the immutable base record set and the filter; nothing is
//! cached per filter state. Callers that want to avoid re-reading the source
//! hold on to the loaded records and recompute snapshots from them (see
//! `app::pipeline::run_analysis_with_orders`).

use crate::domain::{
    GroupKey, GroupedRate, OrderRecord, ROLLING_WINDOW, RollingPoint, SELLER_MIN_ORDERS,
    SELLER_TOP_N, ViewFilter,
};
use crate::stats::{aggregate, rolling};

/// All metrics for one filter state.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub filter: ViewFilter,
    /// NaN when the filtered subset is empty; render a fallback, not a chart.
    pub overall_rate: f64,
    pub total_orders: usize,
    pub distinct_sellers: usize,
    pub distinct_customers: usize,
    pub by_category: Vec<GroupedRate>,
    pub by_region: Vec<GroupedRate>,
    /// Empty when no seller meets the order threshold.
    pub seller_ranking: Vec<GroupedRate>,
    /// Empty when the filtered subset has no dates.
    pub rolling_trend: Vec<RollingPoint>,
}

impl ViewSnapshot {
    /// Compute every view metric from the filtered subset of `records`.
    pub fn compute(records: &[OrderRecord], filter: &ViewFilter) -> Self {
        let subset: Vec<OrderRecord> = records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        let daily = aggregate::daily_aggregate(&subset);

        Self {
            filter: filter.clone(),
            overall_rate: aggregate::overall_rate(&subset),
            total_orders: aggregate::total_orders(&subset),
            distinct_sellers: aggregate::distinct_sellers(&subset),
            distinct_customers: aggregate::distinct_customers(&subset),
            by_category: aggregate::grouped_rates(&subset, GroupKey::Category),
            by_region: aggregate::grouped_rates(&subset, GroupKey::Region),
            seller_ranking: aggregate::seller_ranking(&subset, SELLER_MIN_ORDERS, SELLER_TOP_N),
            rolling_trend: rolling::rolling_rate(&daily, ROLLING_WINDOW),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(category: &str, region: &str, seller: &str, returned: bool) -> OrderRecord {
        OrderRecord {
            order_id: "O".to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            customer_id: "C".to_string(),
            seller_id: seller.to_string(),
            category: category.to_string(),
            region: region.to_string(),
            payment_method: "UPI".to_string(),
            price: 10.0,
            seller_rating: 4.0,
            is_returned: returned,
        }
    }

    #[test]
    fn snapshot_recomputes_from_filtered_subset() {
        let records = vec![
            order("Books", "East", "S1", true),
            order("Books", "West", "S2", false),
            order("Toys", "East", "S1", false),
        ];

        let filter = ViewFilter {
            category: Some("Books".to_string()),
            ..ViewFilter::default()
        };
        let snap = ViewSnapshot::compute(&records, &filter);

        assert_eq!(snap.total_orders, 2);
        assert!((snap.overall_rate - 0.5).abs() < 1e-12);
        assert_eq!(snap.distinct_sellers, 2);
        // Grouped rates only see the filtered categories.
        assert_eq!(snap.by_category.len(), 1);
        assert_eq!(snap.by_category[0].key, "Books");
    }

    #[test]
    fn empty_subset_produces_explicit_empty_snapshot() {
        let records = vec![order("Books", "East", "S1", true)];
        let filter = ViewFilter {
            category: Some("Garden".to_string()),
            ..ViewFilter::default()
        };
        let snap = ViewSnapshot::compute(&records, &filter);

        assert!(snap.is_empty());
        assert!(snap.overall_rate.is_nan());
        assert!(snap.by_category.is_empty());
        assert!(snap.seller_ranking.is_empty());
        assert!(snap.rolling_trend.is_empty());
    }

    #[test]
    fn base_records_are_not_mutated() {
        let records = vec![
            order("Books", "East", "S1", true),
            order("Toys", "West", "S2", false),
        ];
        let before = records.clone();
        let filter = ViewFilter {
            seller: Some("S1".to_string()),
            ..ViewFilter::default()
        };
        let _ = ViewSnapshot::compute(&records, &filter);
        assert_eq!(records, before);
    }
}
