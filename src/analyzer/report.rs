use chrono::NaiveDateTime;
use serde::Serialize;

use super::metrics::{
    compute_metrics, compute_resolution, overdue_tickets, priority_distribution,
    status_distribution, CategoryCount, KeyMetrics, OverdueTicket, ResolutionStats,
};
use crate::export::display_rows;
use crate::parser::types::TicketTable;

/// Filtered rows as shown to the user, cells already rendered to text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything the report screen shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReport {
    pub generated_at: NaiveDateTime,
    pub tickets: TableView,
    pub metrics: KeyMetrics,
    pub status_distribution: Vec<CategoryCount>,
    pub priority_distribution: Vec<CategoryCount>,
    /// `None` = not available (missing "Created" or "Resolution Date").
    pub resolution: Option<ResolutionStats>,
    /// `None` = not available (missing "Due date").
    pub overdue_tickets: Option<Vec<OverdueTicket>>,
}

/// Aggregate an already filtered table. `now` is the reference for the overdue test.
pub fn build_report(filtered: &TicketTable, now: NaiveDateTime) -> TicketReport {
    TicketReport {
        generated_at: now,
        tickets: TableView {
            columns: filtered.columns.clone(),
            rows: display_rows(filtered),
        },
        metrics: compute_metrics(filtered, now),
        status_distribution: status_distribution(filtered),
        priority_distribution: priority_distribution(filtered),
        resolution: compute_resolution(filtered),
        overdue_tickets: overdue_tickets(filtered, now),
    }
}
