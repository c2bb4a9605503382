use std::io::{Read, Seek};

use calamine::{open_workbook_auto_from_rs, Reader};

use crate::error::LoadError;
use crate::parser::deserializers::{cell_from_calamine, cell_from_text};
use crate::parser::types::{CellValue, RawSheet};

/// Extensions handed to calamine.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the named sheet of a workbook. The first row of the used range is the header.
pub fn read_workbook_sheet<RS>(reader: RS, sheet_name: &str) -> Result<RawSheet, LoadError>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet_name) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_from_calamine(cell).to_string())
            .collect(),
        None => return Err(LoadError::EmptyFile),
    };

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_from_calamine).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

/// Read a comma-separated export. Blank lines are skipped by the reader,
/// short lines are padded later during normalization.
pub fn read_csv_sheet<R: Read>(reader: R) -> Result<RawSheet, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .double_quote(true)
        .quoting(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(cell_from_text).collect());
    }

    Ok(RawSheet { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::Cursor;

    fn workbook_bytes(sheet: &str, rows: &[&[&str]]) -> Vec<u8> {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name(sheet).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    ws.write(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_named_sheet() {
        let bytes = workbook_bytes(
            "Your Jira Issues",
            &[&["Key", "Status"], &["PROJ-1", "Done"], &["PROJ-2", ""]],
        );
        let sheet = read_workbook_sheet(Cursor::new(bytes), "Your Jira Issues").unwrap();
        assert_eq!(sheet.headers, vec!["Key", "Status"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], CellValue::Text("Done".into()));
        assert!(sheet.rows[1][1].is_blank());
    }

    #[test]
    fn test_missing_sheet() {
        let bytes = workbook_bytes("Other", &[&["Key"], &["PROJ-1"]]);
        match read_workbook_sheet(Cursor::new(bytes), "Your Jira Issues").unwrap_err() {
            LoadError::SheetNotFound { sheet, available } => {
                assert_eq!(sheet, "Your Jira Issues");
                assert_eq!(available, vec!["Other".to_string()]);
            }
            e => panic!("Expected SheetNotFound, got {:?}", e),
        }
    }

    #[test]
    fn test_not_a_workbook() {
        let err = read_workbook_sheet(Cursor::new(b"definitely not a zip".to_vec()), "Sheet1")
            .unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)), "got {:?}", err);
    }

    #[test]
    fn test_csv_with_bom_and_quotes() {
        let data = "\u{FEFF}Key,Summary\nPROJ-1,\"Login, then crash\"\nPROJ-2,\n";
        let sheet = read_csv_sheet(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["Key", "Summary"]);
        assert_eq!(sheet.rows[0][1], CellValue::Text("Login, then crash".into()));
        assert_eq!(sheet.rows[1][1], CellValue::Empty);
    }

    #[test]
    fn test_csv_empty() {
        assert!(matches!(
            read_csv_sheet("".as_bytes()),
            Err(LoadError::EmptyFile)
        ));
    }
}
