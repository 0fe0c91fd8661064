//! Return-rate aggregation.
//!
//! All grouped outputs are recomputed fresh from the record set they are
//! given; nothing here caches across filter states. Grouping goes through a
//! `BTreeMap` so the base ordering is deterministic, and the display sort
//! (descending by rate) is stable on top of it. Tie order is therefore
//! reproducible but not meaningful; callers must not rely on it.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{DailyCount, GroupKey, GroupedRate, OrderRecord};

/// Mean of `is_returned` over the whole set.
///
/// Returns NaN on an empty set; callers must guard before display.
pub fn overall_rate(records: &[OrderRecord]) -> f64 {
    let returned = records.iter().filter(|r| r.is_returned).count();
    returned as f64 / records.len() as f64
}

/// Count of orders in the set (export convenience).
pub fn total_orders(records: &[OrderRecord]) -> usize {
    records.len()
}

/// Number of distinct sellers in the set.
pub fn distinct_sellers(records: &[OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.seller_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Number of distinct customers in the set.
pub fn distinct_customers(records: &[OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Return rate per distinct value of `key`, sorted descending by rate.
pub fn grouped_rates(records: &[OrderRecord], key: GroupKey) -> Vec<GroupedRate> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(key.value_of(r)).or_insert((0, 0));
        entry.0 += 1;
        if r.is_returned {
            entry.1 += 1;
        }
    }

    let mut out: Vec<GroupedRate> = groups
        .into_iter()
        .map(|(k, (orders, returned))| GroupedRate {
            key: k.to_string(),
            orders,
            rate: returned as f64 / orders as f64,
        })
        .collect();

    // Stable sort: ties keep the deterministic key order from the BTreeMap.
    out.sort_by(|a, b| b.rate.partial_cmp(&a.rate).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Seller ranking for display: sellers with at least `min_orders` orders,
/// sorted descending by rate, truncated to `top_n`.
///
/// An empty result is valid (no seller met the threshold); the caller renders
/// a "not enough data" fallback instead of an empty chart.
pub fn seller_ranking(records: &[OrderRecord], min_orders: usize, top_n: usize) -> Vec<GroupedRate> {
    let mut ranking = grouped_rates(records, GroupKey::Seller);
    ranking.retain(|g| g.orders >= min_orders);
    ranking.truncate(top_n);
    ranking
}

/// Per-date order totals, sorted ascending by date.
///
/// Dates absent from the data are absent from the output; the sequence is
/// sparse by design (no zero-filling of calendar gaps).
pub fn daily_aggregate(records: &[OrderRecord]) -> Vec<DailyCount> {
    let mut days: BTreeMap<chrono::NaiveDate, (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = days.entry(r.order_date).or_insert((0, 0));
        entry.0 += 1;
        if r.is_returned {
            entry.1 += 1;
        }
    }
    days.into_iter()
        .map(|(date, (total, returns))| DailyCount { date, total, returns })
        .collect()
}
