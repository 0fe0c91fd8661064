//! Input/output: CSV ingest and report/export writers.

pub mod export;
pub mod ingest;
