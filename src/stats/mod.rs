//! Descriptive statistics over the cleaned order set.
//!
//! - `aggregate`: overall/grouped return rates, seller ranking, daily totals
//! - `contingency`: category-vs-return contingency table + chi-square test
//! - `rolling`: trailing rolling return rate for the trend view

pub mod aggregate;
pub mod contingency;
pub mod rolling;
