//! Seller review insights: load two annotated review datasets, filter them
//! by rating range, and aggregate the metrics, distributions and comparisons
//! a dashboard renders.

pub mod config;
pub mod dashboard;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod loader;
pub mod review;
pub mod snapshot;
pub mod summary;
pub mod types;
