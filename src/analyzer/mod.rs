pub mod filter;
pub mod metrics;
pub mod report;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use filter::{apply_filters, FilterOptions, FilterSelection};
pub use metrics::{compute_metrics, is_closed, resolution_days, KeyMetrics};
pub use report::{build_report, TicketReport};
