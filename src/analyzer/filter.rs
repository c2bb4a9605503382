use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::parser::types::{Ticket, TicketTable};

/// Distinct values offered by the four selectors, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub issue_types: Vec<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub assignees: Vec<String>,
}

/// Allowed values per category. A row is kept only if it passes all four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub issue_types: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    pub priorities: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
}

impl FilterOptions {
    pub fn from_table(table: &TicketTable) -> Self {
        FilterOptions {
            issue_types: distinct(table, |t| t.issue_type.as_deref()),
            statuses: distinct(table, |t| t.status.as_deref()),
            priorities: distinct(table, |t| t.priority.as_deref()),
            assignees: distinct(table, |t| t.assignee.as_deref()),
        }
    }
}

impl FilterSelection {
    /// Everything selected, i.e. the state of the selectors right after a load.
    pub fn all(options: &FilterOptions) -> Self {
        FilterSelection {
            issue_types: options.issue_types.iter().cloned().collect(),
            statuses: options.statuses.iter().cloned().collect(),
            priorities: options.priorities.iter().cloned().collect(),
            assignees: options.assignees.iter().cloned().collect(),
        }
    }

    /// Issue type, status and priority must be selected; an absent value never is.
    /// An unassigned ticket always passes the assignee test.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        selected(&self.issue_types, ticket.issue_type.as_deref())
            && selected(&self.statuses, ticket.status.as_deref())
            && selected(&self.priorities, ticket.priority.as_deref())
            && ticket
                .assignee
                .as_deref()
                .map_or(true, |a| self.assignees.contains(a))
    }
}

fn selected(allowed: &BTreeSet<String>, value: Option<&str>) -> bool {
    value.is_some_and(|v| allowed.contains(v))
}

fn distinct<'a>(table: &'a TicketTable, field: impl Fn(&'a Ticket) -> Option<&'a str>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values = Vec::new();
    for ticket in &table.tickets {
        if let Some(v) = field(ticket) {
            if seen.insert(v) {
                values.push(v.to_string());
            }
        }
    }
    values
}

/// Filtered copy of the table, row order preserved. An empty result is valid.
pub fn apply_filters(table: &TicketTable, selection: &FilterSelection) -> TicketTable {
    let filtered = table.select(|t| selection.matches(t));
    log::debug!("Filtre: {} / {} tickets retenus", filtered.len(), table.len());
    filtered
}
