use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::stats::{mean, median, percentile};
use crate::parser::columns::{CREATED, DUE_DATE, RESOLUTION_DATE};
use crate::parser::types::{Ticket, TicketTable};

/// Statuts considérés comme fermés (comparaison insensible à la casse).
pub const CLOSED_STATUSES: &[&str] = &["done", "rejected", "declined"];

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// `None` when the table has no "Due date" column.
    pub overdue: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPoint {
    pub key: String,
    pub resolution_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStats {
    pub average_days: Option<f64>,
    pub median_days: Option<f64>,
    pub p90_days: Option<f64>,
    pub sample: usize,
    /// Ordered like the filtered table, not by date.
    pub series: Vec<ResolutionPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueTicket {
    pub key: String,
    pub summary: String,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub due_date: NaiveDateTime,
    pub status: Option<String>,
}

pub fn is_closed(status: Option<&str>) -> bool {
    status.is_some_and(|s| CLOSED_STATUSES.contains(&s.to_lowercase().as_str()))
}

/// Due strictly before `now` and not closed.
pub fn is_overdue(ticket: &Ticket, now: NaiveDateTime) -> bool {
    ticket.due_date.is_some_and(|due| due < now) && !is_closed(ticket.status.as_deref())
}

/// Whole days between creation and resolution, floored (a resolution 30 minutes
/// before creation counts as -1).
pub fn resolution_days(created: NaiveDateTime, resolved: NaiveDateTime) -> i64 {
    (resolved - created).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn compute_metrics(table: &TicketTable, now: NaiveDateTime) -> KeyMetrics {
    let closed = table
        .tickets
        .iter()
        .filter(|t| is_closed(t.status.as_deref()))
        .count();
    let overdue = table
        .has_column(DUE_DATE)
        .then(|| table.tickets.iter().filter(|t| is_overdue(t, now)).count());

    KeyMetrics {
        total: table.len(),
        open: table.len() - closed,
        closed,
        overdue,
    }
}

/// Occurrences per observed value, most frequent first; ties keep first-appearance
/// order. Absent values are not counted.
pub fn distribution<'a>(
    table: &'a TicketTable,
    field: impl Fn(&'a Ticket) -> Option<&'a str>,
) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for ticket in &table.tickets {
        let Some(value) = field(ticket) else { continue };
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(CategoryCount {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn status_distribution(table: &TicketTable) -> Vec<CategoryCount> {
    distribution(table, |t| t.status.as_deref())
}

pub fn priority_distribution(table: &TicketTable) -> Vec<CategoryCount> {
    distribution(table, |t| t.priority.as_deref())
}

/// `None` when either "Created" or "Resolution Date" is missing from the table.
/// Tickets resolved without a creation date are left out of the series.
pub fn compute_resolution(table: &TicketTable) -> Option<ResolutionStats> {
    if !table.has_column(CREATED) || !table.has_column(RESOLUTION_DATE) {
        return None;
    }

    let series: Vec<ResolutionPoint> = table
        .tickets
        .iter()
        .filter_map(|t| {
            let resolved = t.resolution_date?;
            let created = t.created?;
            Some(ResolutionPoint {
                key: t.key.clone(),
                resolution_days: resolution_days(created, resolved),
            })
        })
        .collect();

    let days: Vec<f64> = series.iter().map(|p| p.resolution_days as f64).collect();

    Some(ResolutionStats {
        average_days: mean(&days),
        median_days: median(&days),
        p90_days: percentile(&days, 90.0),
        sample: days.len(),
        series,
    })
}

/// Overdue subset projected on Key, Summary, Assignee, Priority, Due date, Status.
/// `None` when the table has no "Due date" column.
pub fn overdue_tickets(table: &TicketTable, now: NaiveDateTime) -> Option<Vec<OverdueTicket>> {
    if !table.has_column(DUE_DATE) {
        return None;
    }
    let rows = table
        .tickets
        .iter()
        .filter(|t| is_overdue(t, now))
        .filter_map(|t| {
            Some(OverdueTicket {
                key: t.key.clone(),
                summary: t.summary.clone(),
                assignee: t.assignee.clone(),
                priority: t.priority.clone(),
                due_date: t.due_date?,
                status: t.status.clone(),
            })
        })
        .collect();
    Some(rows)
}
