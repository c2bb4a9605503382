pub mod csv_export;
pub mod report_xlsx;

pub use csv_export::{export_csv, CsvDownload, CSV_CONTENT_TYPE, EXPORT_FILE_NAME};
pub use report_xlsx::generate_report_workbook;

use chrono::Timelike;
use rust_xlsxwriter::{Format, FormatBorder};

use crate::parser::types::{CellValue, TicketTable};

/// En-tête bleu #2C5F8A, texte blanc, gras, bordure fine
pub fn create_header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("2C5F8A")
        .set_font_color("FFFFFF")
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

/// Format date-heure yyyy-mm-dd hh:mm
pub fn create_datetime_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd hh:mm")
}

/// Format entier #,##0
pub fn create_integer_format() -> Format {
    Format::new().set_num_format("#,##0")
}

/// Format décimal 0.0 (jours)
pub fn create_days_format() -> Format {
    Format::new().set_num_format("0.0")
}

/// For each column, true when it holds timestamps and every one falls on midnight.
/// Such columns render as bare dates, the others as full timestamps.
pub fn date_only_columns(table: &TicketTable) -> Vec<bool> {
    (0..table.columns.len())
        .map(|i| {
            let mut saw_datetime = false;
            let all_midnight = table.tickets.iter().all(|t| match t.cells.get(i) {
                Some(CellValue::DateTime(dt)) => {
                    saw_datetime = true;
                    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
                }
                _ => true,
            });
            saw_datetime && all_midnight
        })
        .collect()
}

pub fn render_cell(cell: &CellValue, date_only: bool) -> String {
    match cell {
        CellValue::DateTime(dt) if date_only => dt.format("%Y-%m-%d").to_string(),
        other => other.to_string(),
    }
}

/// Every row rendered to text, one entry per column.
pub fn display_rows(table: &TicketTable) -> Vec<Vec<String>> {
    let date_only = date_only_columns(table);
    table
        .tickets
        .iter()
        .map(|t| {
            (0..table.columns.len())
                .map(|i| {
                    t.cells
                        .get(i)
                        .map(|c| render_cell(c, date_only[i]))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}
