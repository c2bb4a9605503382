//! Table builders shared by the analyzer and export tests.

use chrono::NaiveDateTime;

use crate::parser::types::{CellValue, Ticket, TicketTable};

pub const COLUMNS: &[&str] = &[
    "Key",
    "Summary",
    "Issue Type",
    "Status",
    "Priority",
    "Assignee",
    "Created",
    "Updated",
    "Due date",
    "Resolution Date",
];

fn text(v: Option<&str>) -> CellValue {
    v.map_or(CellValue::Empty, |s| CellValue::Text(s.to_string()))
}

fn date(v: Option<NaiveDateTime>) -> CellValue {
    v.map_or(CellValue::Empty, CellValue::DateTime)
}

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&format!("{s} 00:00:00"), "%Y-%m-%d %H:%M:%S"))
        .unwrap()
}

/// Ticket without dates. An empty string in a category means "absent".
pub fn ticket(key: &str, issue_type: &str, status: &str, priority: &str, assignee: Option<&str>) -> Ticket {
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let mut t = Ticket {
        key: key.to_string(),
        summary: format!("Summary of {key}"),
        issue_type: opt(issue_type),
        status: opt(status),
        priority: opt(priority),
        assignee: assignee.map(str::to_string),
        created: None,
        updated: None,
        due_date: None,
        resolution_date: None,
        cells: Vec::new(),
    };
    sync_cells(&mut t);
    t
}

pub fn with_dates(
    mut t: Ticket,
    created: Option<&str>,
    due_date: Option<&str>,
    resolution_date: Option<&str>,
) -> Ticket {
    t.created = created.map(dt);
    t.due_date = due_date.map(dt);
    t.resolution_date = resolution_date.map(dt);
    sync_cells(&mut t);
    t
}

fn sync_cells(t: &mut Ticket) {
    t.cells = vec![
        CellValue::Text(t.key.clone()),
        CellValue::Text(t.summary.clone()),
        text(t.issue_type.as_deref()),
        text(t.status.as_deref()),
        text(t.priority.as_deref()),
        text(t.assignee.as_deref()),
        date(t.created),
        date(t.updated),
        date(t.due_date),
        date(t.resolution_date),
    ];
}

pub fn table(tickets: Vec<Ticket>) -> TicketTable {
    TicketTable {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        tickets,
    }
}

/// Same table with one column removed from the header and from every row.
pub fn without_column(mut table: TicketTable, column: &str) -> TicketTable {
    if let Some(i) = table.column_index(column) {
        table.columns.remove(i);
        for t in &mut table.tickets {
            t.cells.remove(i);
        }
    }
    table
}
