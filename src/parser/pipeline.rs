use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use crate::error::LoadError;
use crate::parser::columns::{
    validate_columns, ColumnMap, ASSIGNEE, CREATED, DATE_COLUMNS, DUE_DATE, ISSUE_TYPE, KEY,
    PRIORITY, RESOLUTION_DATE, STATUS, SUMMARY, UPDATED,
};
use crate::parser::deserializers::coerce_datetime;
use crate::parser::sheet::{read_csv_sheet, read_workbook_sheet, SPREADSHEET_EXTENSIONS};
use crate::parser::types::{CellValue, ParseWarning, RawSheet, Ticket, TicketTable};

/// Output of a load: the normalized table plus import metadata.
#[derive(Debug)]
pub struct LoadOutput {
    pub table: TicketTable,
    pub warnings: Vec<ParseWarning>,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub parse_duration_ms: u64,
}

/// Load a ticket export from disk. The format is chosen from the extension.
pub fn load_file(
    path: &Path,
    sheet_name: &str,
    extra_date_formats: &[String],
) -> Result<LoadOutput, LoadError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_bytes(name, bytes, sheet_name, extra_date_formats)
}

/// Load an uploaded file held in memory. `name` only drives format detection;
/// a name without extension is treated as a workbook and sniffed by content.
pub fn load_bytes(
    name: &str,
    bytes: Vec<u8>,
    sheet_name: &str,
    extra_date_formats: &[String],
) -> Result<LoadOutput, LoadError> {
    let start = Instant::now();

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let raw = if ext == "csv" {
        read_csv_sheet(bytes.as_slice())?
    } else if ext.is_empty() || SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        // calamine sniffs the container when the name carries no extension
        read_workbook_sheet(Cursor::new(bytes), sheet_name)?
    } else {
        return Err(LoadError::UnsupportedFormat(name.to_string()));
    };

    let mut output = normalize(raw, extra_date_formats)?;
    output.parse_duration_ms = start.elapsed().as_millis() as u64;

    log::info!(
        "{} chargé: {} tickets en {} ms",
        name,
        output.table.len(),
        output.parse_duration_ms
    );
    if !output.missing_optional_columns.is_empty() {
        log::info!(
            "Colonnes optionnelles absentes: {}",
            output.missing_optional_columns.join(", ")
        );
    }

    Ok(output)
}

/// Trim headers, validate columns and coerce date columns.
/// Every input row yields exactly one ticket, except trailing fully blank rows.
pub fn normalize(raw: RawSheet, extra_date_formats: &[String]) -> Result<LoadOutput, LoadError> {
    if raw.headers.is_empty() {
        return Err(LoadError::EmptyFile);
    }
    let col_map = ColumnMap::from_headers(&raw.headers);
    let col_validation = validate_columns(&col_map)?;
    let width = col_map.all_headers().len();

    let date_indices: Vec<(&str, usize)> = DATE_COLUMNS
        .iter()
        .filter_map(|&c| col_map.index(c).map(|i| (c, i)))
        .collect();

    let mut rows = raw.rows;
    while rows
        .last()
        .is_some_and(|row| row.iter().all(CellValue::is_blank))
    {
        rows.pop();
    }

    let mut tickets = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();

    for (row_idx, mut cells) in rows.into_iter().enumerate() {
        let line = row_idx + 2; // header row + 1-based
        if cells.len() > width {
            let extra = cells.split_off(width);
            if extra.iter().any(|c| !c.is_blank()) {
                log::warn!("Ligne {}: {} champ(s) en trop ignoré(s)", line, extra.len());
                warnings.push(ParseWarning {
                    line,
                    message: format!(
                        "{} champ(s) au-delà des {} colonnes ignoré(s)",
                        extra.len(),
                        width
                    ),
                });
            }
        }
        cells.resize(width, CellValue::Empty);

        for &(col, i) in &date_indices {
            let cell = &cells[i];
            let coerced = coerce_datetime(cell, extra_date_formats);
            if coerced.is_none() && !cell.is_blank() {
                log::warn!("Ligne {}: date invalide dans {:?}: {}", line, col, cell);
                warnings.push(ParseWarning {
                    line,
                    message: format!("{} invalide: {:?}", col, cell.to_string()),
                });
            }
            cells[i] = coerced.map_or(CellValue::Empty, CellValue::DateTime);
        }

        tickets.push(row_to_ticket(&col_map, cells));
    }

    Ok(LoadOutput {
        table: TicketTable {
            columns: col_validation.present,
            tickets,
        },
        warnings,
        detected_columns: col_map.all_headers().to_vec(),
        missing_optional_columns: col_validation.missing_optional,
        parse_duration_ms: 0,
    })
}

fn row_to_ticket(col_map: &ColumnMap, cells: Vec<CellValue>) -> Ticket {
    let label = |col: &str| col_map.get(&cells, col).and_then(CellValue::as_label);
    let date = |col: &str| col_map.get(&cells, col).and_then(CellValue::as_datetime);

    Ticket {
        key: label(KEY).unwrap_or_default(),
        summary: label(SUMMARY).unwrap_or_default(),
        issue_type: label(ISSUE_TYPE),
        status: label(STATUS),
        priority: label(PRIORITY),
        assignee: label(ASSIGNEE),
        created: date(CREATED),
        updated: date(UPDATED),
        due_date: date(DUE_DATE),
        resolution_date: date(RESOLUTION_DATE),
        cells,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HDR: &str = "Key,Summary,Issue Type,Status,Priority,Assignee,Created,Updated,Due date,Resolution Date,Sprint";

    fn parse(csv: &str) -> LoadOutput {
        load_bytes("export.csv", csv.as_bytes().to_vec(), "unused", &[]).unwrap()
    }

    fn parse_err(csv: &str) -> LoadError {
        load_bytes("export.csv", csv.as_bytes().to_vec(), "unused", &[]).unwrap_err()
    }

    // ── Dates ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_dates_parsed() {
        let out = parse(&format!(
            "{HDR}\nP-1,S,Bug,Done,High,ann,2024-01-01,2024-01-02 10:00:00,,2024-01-05,S1"
        ));
        let t = &out.table.tickets[0];
        assert_eq!(t.created.unwrap().to_string(), "2024-01-01 00:00:00");
        assert_eq!(t.updated.unwrap().to_string(), "2024-01-02 10:00:00");
        assert!(t.due_date.is_none());
        assert_eq!(t.resolution_date.unwrap().to_string(), "2024-01-05 00:00:00");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unparseable_date_becomes_absent() {
        let out = parse(&format!("{HDR}\nP-1,S,Bug,Done,High,ann,yesterday,,soon,,S1"));
        let t = &out.table.tickets[0];
        assert!(t.created.is_none());
        assert!(t.due_date.is_none());
        assert_eq!(t.cells[6], CellValue::Empty);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].line, 2);
    }

    // ── Row preservation ──────────────────────────────────────────────────────

    #[test]
    fn test_row_count_preserved() {
        let out = parse(&format!(
            "{HDR}\nP-1,S,Bug,Done,High,ann,,,,,\nP-2,S,Task,,,,,,,,\nP-3,S,Bug,To Do,Low,,,,,,"
        ));
        assert_eq!(out.table.len(), 3);
        assert!(out.table.tickets[1].status.is_none());
        assert!(out.table.tickets[2].assignee.is_none());
    }

    #[test]
    fn test_short_rows_padded() {
        let out = parse(&format!("{HDR}\nP-1,S,Bug"));
        let t = &out.table.tickets[0];
        assert_eq!(t.cells.len(), 11);
        assert!(t.status.is_none());
    }

    #[test]
    fn test_extra_fields_dropped_with_warning() {
        let out = parse(&format!(
            "{HDR}\nP-1,S,Bug,Done,High,ann,,,,,S1,overflow\nP-2,S,Bug,Done,High,ann,,,,,S1,"
        ));
        assert_eq!(out.table.len(), 2);
        assert_eq!(out.table.tickets[0].cells.len(), 11);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].line, 2);
        assert!(out.warnings[0].message.contains("1 champ"));
    }

    #[test]
    fn test_whitespace_category_is_a_value() {
        let out = parse(&format!("{HDR}\nP-1,S,Bug, ,High, ,,,,,"));
        let t = &out.table.tickets[0];
        assert_eq!(t.status.as_deref(), Some(" "));
        assert_eq!(t.assignee.as_deref(), Some(" "));
    }

    #[test]
    fn test_trailing_blank_rows_dropped() {
        let raw = RawSheet {
            headers: HDR.split(',').map(str::to_string).collect(),
            rows: vec![
                vec![CellValue::Text("P-1".into())],
                vec![CellValue::Empty, CellValue::Text("  ".into())],
            ],
        };
        let out = normalize(raw, &[]).unwrap();
        assert_eq!(out.table.len(), 1);
    }

    #[test]
    fn test_passthrough_columns_kept() {
        let out = parse(&format!("{HDR}\nP-1,S,Bug,Done,High,ann,,,,,Sprint 7"));
        assert_eq!(out.table.columns.last().unwrap(), "Sprint");
        assert_eq!(out.table.tickets[0].cells[10], CellValue::Text("Sprint 7".into()));
    }

    #[test]
    fn test_header_whitespace_stripped() {
        let out = parse(
            " Key , Summary ,Issue Type,Status,Priority,Assignee\nP-1,S,Bug,Done,High,ann",
        );
        assert_eq!(out.table.columns[0], "Key");
        assert_eq!(out.table.tickets[0].key, "P-1");
        assert_eq!(out.table.tickets[0].summary, "S");
    }

    // ── Columns ───────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_optional_reported() {
        let out = parse("Key,Summary,Issue Type,Status,Priority,Assignee,Created\nP-1,S,Bug,Done,High,ann,2024-01-01");
        assert_eq!(
            out.missing_optional_columns,
            vec!["Updated", "Due date", "Resolution Date"]
        );
        assert!(out.table.tickets[0].created.is_some());
    }

    #[test]
    fn test_missing_required_column_error() {
        match parse_err("Key,Summary\nP-1,S") {
            LoadError::MissingColumns(cols) => assert!(cols.contains(&"Status".to_string())),
            e => panic!("Expected MissingColumns, got {:?}", e),
        }
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let out = parse(HDR);
        assert!(out.table.is_empty());
        assert_eq!(out.table.columns.len(), 11);
    }

    // ── Formats ───────────────────────────────────────────────────────────────

    #[test]
    fn test_unsupported_extension() {
        let err = load_bytes("notes.txt", b"Key".to_vec(), "Sheet1", &[]).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/nonexistent/TestJIRA.xlsx"), "Your Jira Issues", &[])
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_workbook_without_extension_sniffed() {
        let mut wb = rust_xlsxwriter::Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Your Jira Issues").unwrap();
        for (c, h) in HDR.split(',').enumerate() {
            ws.write(0, c as u16, h).unwrap();
        }
        for (c, v) in ["P-1", "S", "Bug", "Done", "High", "ann"].iter().enumerate() {
            ws.write(1, c as u16, *v).unwrap();
        }
        let bytes = wb.save_to_buffer().unwrap();

        let out = load_bytes("upload", bytes, "Your Jira Issues", &[]).unwrap();
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table.tickets[0].key, "P-1");
    }

    #[test]
    fn test_text_without_extension_rejected() {
        let err = load_bytes("upload", b"Key,Summary".to_vec(), "Sheet1", &[]).unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)));
    }

    #[test]
    fn test_uppercase_extension() {
        let out = load_bytes(
            "EXPORT.CSV",
            format!("{HDR}\nP-1,S,Bug,Done,High,ann,,,,,").into_bytes(),
            "unused",
            &[],
        )
        .unwrap();
        assert_eq!(out.table.len(), 1);
    }
}
