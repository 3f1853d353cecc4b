//! Dashboard module
//!
//! Provides an overview page showing summary totals, monthly charts and the
//! most recent transactions.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub use aggregation::{MonthlyAggregate, Summary, compute_monthly_series, compute_summary};
pub use handlers::get_dashboard_page;
