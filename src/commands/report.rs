use chrono::{Local, NaiveDateTime};

use crate::analyzer::filter::{apply_filters, FilterOptions, FilterSelection};
use crate::analyzer::report::{build_report, TicketReport};
use crate::parser::types::TicketTable;
use crate::state::{AppState, SessionAccess};

/// Values offered by the four selectors for the loaded file.
pub fn get_filter_options(state: &AppState) -> Result<FilterOptions, String> {
    state.session(|s| s.filter_options.clone())
}

/// Selection with every observed value checked, as captured at load time.
pub fn default_selection(state: &AppState) -> Result<FilterSelection, String> {
    state.session(|s| FilterSelection::all(&s.filter_options))
}

/// Filtered copy of the session table.
pub fn filtered_table(state: &AppState, selection: &FilterSelection) -> Result<TicketTable, String> {
    state.session(|s| apply_filters(&s.table, selection))
}

/// Full recomputation for one selection, evaluated against the wall clock.
pub fn get_report(state: &AppState, selection: &FilterSelection) -> Result<TicketReport, String> {
    run_report_logic(state, selection, Local::now().naive_local()).map(|(report, _)| report)
}

/// Report plus the filtered table it was built from. `now` drives the overdue test.
pub fn run_report_logic(
    state: &AppState,
    selection: &FilterSelection,
    now: NaiveDateTime,
) -> Result<(TicketReport, TicketTable), String> {
    let filtered = filtered_table(state, selection)?;
    let report = build_report(&filtered, now);
    Ok((report, filtered))
}
