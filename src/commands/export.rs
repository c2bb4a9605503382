use std::path::Path;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;

use super::report::{filtered_table, run_report_logic};
use crate::analyzer::filter::FilterSelection;
use crate::export::{export_csv, generate_report_workbook, CsvDownload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub path: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

/// CSV download of the filtered rows (`filtered_jira_issues.csv`, `text/csv`).
pub fn export_filtered_csv(
    state: &AppState,
    selection: &FilterSelection,
) -> Result<CsvDownload, String> {
    let filtered = filtered_table(state, selection)?;
    let bytes = export_csv(&filtered).map_err(|e| e.to_string())?;
    log::info!("Export CSV: {} tickets, {} octets", filtered.len(), bytes.len());
    Ok(CsvDownload::new(bytes))
}

/// Write the three-sheet Excel report for the selection to `path`.
pub fn export_excel_report(
    state: &AppState,
    selection: &FilterSelection,
    path: &Path,
) -> Result<ExportResult, String> {
    let start = Instant::now();

    let (report, filtered) = run_report_logic(state, selection, Local::now().naive_local())?;
    let bytes = generate_report_workbook(&report, &filtered).map_err(|e| e.to_string())?;

    std::fs::write(path, &bytes).map_err(|e| e.to_string())?;
    log::info!("Rapport Excel écrit: {}", path.display());

    Ok(ExportResult {
        path: path.display().to_string(),
        size_bytes: bytes.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}
