//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the cleaned order record (`OrderRecord`)
//! - grouping selectors (`GroupKey`) and filter state (`ViewFilter`)
//! - analytics outputs (`GroupedRate`, `ChiSquareResult`, `LogitSummary`, ...)

pub mod types;

pub use types::*;
