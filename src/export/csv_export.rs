use serde::Serialize;

use crate::error::AppError;
use crate::export::display_rows;
use crate::parser::types::TicketTable;

pub const EXPORT_FILE_NAME: &str = "filtered_jira_issues.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Download offered to the user: fixed name, `text/csv`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CsvDownload {
    pub fn new(bytes: Vec<u8>) -> Self {
        CsvDownload {
            file_name: EXPORT_FILE_NAME.to_string(),
            content_type: CSV_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

/// Serialize the table with its header row and every column, no index column.
/// An empty table yields the header line alone.
pub fn export_csv(table: &TicketTable) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.columns)?;
    for row in display_rows(table) {
        wtr.write_record(&row)?;
    }
    wtr.into_inner().map_err(|e| AppError::Io(e.into_error()))
}
