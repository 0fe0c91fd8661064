//! Seeded synthetic orders generation.
//!
//! The generator produces a plausible orders CSV so the pipeline can be
//! exercised without real data: per-category price levels and base return
//! rates, a skewed seller distribution (a few sellers take most orders, so
//! the >= 50-order ranking threshold is actually reachable), and a return
//! probability that depends on category, price, and seller rating. Output is
//! deterministic for a fixed seed.

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::OrderRecord;
use crate::error::AppError;

const CATEGORIES: [(&str, f64, f64); 6] = [
    // (name, log-price mean, base return log-odds)
    ("Books", 2.6, -2.2),
    ("Clothing", 3.4, -1.1),
    ("Electronics", 5.1, -1.6),
    ("Home", 3.9, -1.9),
    ("Sports", 3.7, -1.8),
    ("Toys", 3.0, -2.0),
];

const REGIONS: [&str; 4] = ["East", "North", "South", "West"];

const PAYMENT_METHODS: [&str; 5] = ["COD", "Credit Card", "Debit Card", "UPI", "Wallet"];

const SELLER_POOL: usize = 40;
const CUSTOMER_POOL: usize = 1500;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub days: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 5000,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 365,
        }
    }
}

/// Generate a deterministic synthetic order set.
pub fn generate_orders(config: &SampleConfig) -> Result<Vec<OrderRecord>, AppError> {
    if config.rows == 0 {
        return Err(AppError::invalid_argument("Sample row count must be > 0."));
    }
    if config.days == 0 {
        return Err(AppError::invalid_argument("Sample date span must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let price_noise = LogNormal::<f64>::new(0.0, 0.45)
        .map_err(|e| AppError::invalid_argument(format!("Price distribution error: {e}")))?;
    let rating_noise = Normal::<f64>::new(0.0, 0.4)
        .map_err(|e| AppError::invalid_argument(format!("Rating distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let (category, log_price_mean, base_log_odds) =
            CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];
        let payment_method = PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())];

        // Square the uniform draw to skew volume toward low seller indices;
        // that gives a handful of sellers enough orders to pass the ranking
        // threshold while the tail stays sparse.
        let u: f64 = rng.gen_range(0.0..1.0);
        let seller_idx = ((u * u) * SELLER_POOL as f64) as usize;
        let seller_id = format!("S{:03}", seller_idx.min(SELLER_POOL - 1) + 1);

        let customer_id = format!("C{:04}", rng.gen_range(1..=CUSTOMER_POOL));

        let price = (log_price_mean.exp() * price_noise.sample(&mut rng)).max(0.5);
        let seller_rating = (4.1 + rating_noise.sample(&mut rng)).clamp(1.0, 5.0);

        let offset = rng.gen_range(0..config.days);
        let order_date = config
            .start_date
            .checked_add_days(Days::new(offset))
            .unwrap_or(config.start_date);

        // Return propensity: category baseline, pricier items come back a
        // little more often, better-rated sellers a little less often.
        let log_odds = base_log_odds + 0.003 * (price - log_price_mean.exp())
            - 0.6 * (seller_rating - 4.1);
        let p_return = 1.0 / (1.0 + (-log_odds).exp());
        let is_returned = rng.gen_range(0.0..1.0) < p_return;

        records.push(OrderRecord {
            order_id: format!("O{:06}", i + 1),
            order_date,
            customer_id,
            seller_id,
            category: category.to_string(),
            region: region.to_string(),
            payment_method: payment_method.to_string(),
            price,
            seller_rating,
            is_returned,
        });
    }

    Ok(records)
}

/// Write records as an orders CSV consumable by `io::ingest::load_orders`.
pub fn write_orders_csv(path: &std::path::Path, records: &[OrderRecord]) -> Result<(), AppError> {
    use std::io::Write;

    let mut file = std::fs::File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create '{}': {e}", path.display())))?;

    writeln!(
        file,
        "order_id,order_date,customer_id,seller_id,category,region,payment_method,price,seller_rating,is_returned"
    )
    .map_err(|e| AppError::export(format!("Failed to write '{}': {e}", path.display())))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{:.2},{:.2},{}",
            r.order_id,
            r.order_date.format("%Y-%m-%d"),
            r.customer_id,
            r.seller_id,
            r.category,
            r.region,
            r.payment_method,
            r.price,
            r.seller_rating,
            u8::from(r.is_returned)
        )
        .map_err(|e| AppError::export(format!("Failed to write '{}': {e}", path.display())))?;
    }

    Ok(())
}
