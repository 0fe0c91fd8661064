//! Synthetic data generation for demos and pipeline smoke tests.

pub mod sample;

pub use sample::{SampleConfig, generate_orders, write_orders_csv};
