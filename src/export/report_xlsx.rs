use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::analyzer::metrics::CategoryCount;
use crate::analyzer::report::TicketReport;
use crate::error::AppError;
use crate::export::{
    create_datetime_format, create_days_format, create_header_format, create_integer_format,
};
use crate::parser::types::{CellValue, TicketTable};

const NOT_AVAILABLE: &str = "n/d";

fn xlsx_err(e: XlsxError) -> AppError {
    AppError::Custom(e.to_string())
}

/// Génère le rapport Excel 3 onglets : Indicateurs, Tickets, En retard.
/// Retourne les bytes XLSX via workbook.save_to_buffer().
pub fn generate_report_workbook(
    report: &TicketReport,
    filtered: &TicketTable,
) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_indicateurs(&mut wb, report).map_err(xlsx_err)?;
    write_tickets(&mut wb, filtered).map_err(xlsx_err)?;
    write_overdue(&mut wb, report).map_err(xlsx_err)?;
    wb.save_to_buffer().map_err(xlsx_err)
}

// ── Onglet 1 : Indicateurs ────────────────────────────────────────────────────

fn write_indicateurs(wb: &mut Workbook, report: &TicketReport) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Indicateurs")?;

    let hdr = create_header_format();
    let int = create_integer_format();
    let days = create_days_format();

    ws.write_with_format(0, 0, "Indicateur", &hdr)?;
    ws.write_with_format(0, 1, "Valeur", &hdr)?;

    let m = &report.metrics;
    let kpis: [(&str, Option<usize>); 4] = [
        ("Total tickets", Some(m.total)),
        ("Tickets ouverts", Some(m.open)),
        ("En retard", m.overdue),
        ("Tickets fermés", Some(m.closed)),
    ];
    let mut row = 1u32;
    for (label, value) in kpis {
        ws.write(row, 0, label)?;
        match value {
            Some(v) => ws.write_with_format(row, 1, v as f64, &int)?,
            None => ws.write(row, 1, NOT_AVAILABLE)?,
        };
        row += 1;
    }

    // Résolution
    row += 1;
    ws.write_with_format(row, 0, "Résolution (jours)", &hdr)?;
    ws.write_with_format(row, 1, "Valeur", &hdr)?;
    row += 1;
    let stats: [(&str, Option<f64>); 4] = match &report.resolution {
        Some(r) => [
            ("Moyenne", r.average_days),
            ("Médiane", r.median_days),
            ("P90", r.p90_days),
            ("Échantillon", Some(r.sample as f64)),
        ],
        None => [("Moyenne", None), ("Médiane", None), ("P90", None), ("Échantillon", None)],
    };
    for (label, value) in stats {
        ws.write(row, 0, label)?;
        match value {
            Some(v) => ws.write_with_format(row, 1, v, &days)?,
            None => ws.write(row, 1, NOT_AVAILABLE)?,
        };
        row += 1;
    }

    row += 1;
    row = write_distribution(ws, row, "Statut", &report.status_distribution, &hdr, &int)?;
    row += 1;
    write_distribution(ws, row, "Priorité", &report.priority_distribution, &hdr, &int)?;

    ws.set_column_width(0, 24)?;
    ws.set_column_width(1, 14)?;

    Ok(())
}

/// Writes a category → count block and returns the next free row.
fn write_distribution(
    ws: &mut Worksheet,
    start_row: u32,
    title: &str,
    counts: &[CategoryCount],
    hdr: &Format,
    int: &Format,
) -> Result<u32, XlsxError> {
    ws.write_with_format(start_row, 0, title, hdr)?;
    ws.write_with_format(start_row, 1, "Nb tickets", hdr)?;
    let mut row = start_row + 1;
    for c in counts {
        ws.write(row, 0, c.label.as_str())?;
        ws.write_with_format(row, 1, c.count as f64, int)?;
        row += 1;
    }
    Ok(row)
}

// ── Onglet 2 : Tickets filtrés ────────────────────────────────────────────────

fn write_tickets(wb: &mut Workbook, filtered: &TicketTable) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Tickets")?;

    let hdr = create_header_format();
    let date = create_datetime_format();

    for (col, name) in filtered.columns.iter().enumerate() {
        ws.write_with_format(0, col as u16, name.as_str(), &hdr)?;
    }

    for (i, ticket) in filtered.tickets.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in ticket.cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    ws.write(row, col, s.as_str())?;
                }
                CellValue::Number(n) => {
                    ws.write(row, col, *n)?;
                }
                CellValue::Bool(b) => {
                    ws.write(row, col, *b)?;
                }
                CellValue::DateTime(dt) => {
                    ws.write_datetime_with_format(row, col, dt, &date)?;
                }
            }
        }
    }

    if !filtered.columns.is_empty() {
        ws.set_freeze_panes(1, 0)?;
        if !filtered.is_empty() {
            ws.autofilter(
                0,
                0,
                filtered.len() as u32,
                (filtered.columns.len() - 1) as u16,
            )?;
        }
    }

    Ok(())
}

// ── Onglet 3 : Tickets en retard ─────────────────────────────────────────────

fn write_overdue(wb: &mut Workbook, report: &TicketReport) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("En retard")?;

    let Some(overdue) = &report.overdue_tickets else {
        ws.write(0, 0, "Colonne \"Due date\" absente du fichier")?;
        return Ok(());
    };

    let hdr = create_header_format();
    let date = create_datetime_format();

    let headers = ["Key", "Summary", "Assignee", "Priority", "Due date", "Status"];
    for (col, h) in headers.iter().enumerate() {
        ws.write_with_format(0, col as u16, *h, &hdr)?;
    }

    for (i, t) in overdue.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, t.key.as_str())?;
        ws.write(row, 1, t.summary.as_str())?;
        ws.write(row, 2, t.assignee.as_deref().unwrap_or(""))?;
        ws.write(row, 3, t.priority.as_deref().unwrap_or(""))?;
        ws.write_datetime_with_format(row, 4, &t.due_date, &date)?;
        ws.write(row, 5, t.status.as_deref().unwrap_or(""))?;
    }

    ws.set_column_width(1, 48)?;
    ws.set_column_width(4, 18)?;
    ws.set_freeze_panes(1, 0)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::report::build_report;
    use crate::analyzer::test_support::{dt, table, ticket, with_dates, without_column};
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn sample() -> TicketTable {
        table(vec![
            with_dates(ticket("P-1", "Bug", "To Do", "High", Some("ann")), Some("2024-01-01"), Some("2024-02-01"), None),
            with_dates(ticket("P-2", "Task", "Done", "Low", None), Some("2024-01-01"), None, Some("2024-01-05")),
        ])
    }

    #[test]
    fn test_workbook_is_zip() {
        let t = sample();
        let bytes = generate_report_workbook(&build_report(&t, dt("2024-06-01")), &t).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_workbook_sheets_and_content() {
        let t = sample();
        let bytes = generate_report_workbook(&build_report(&t, dt("2024-06-01")), &t).unwrap();
        let mut wb: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Indicateurs", "Tickets", "En retard"]);

        let tickets = wb.worksheet_range("Tickets").unwrap();
        assert_eq!(tickets.height(), 3);
        assert_eq!(tickets.get((1, 0)), Some(&Data::String("P-1".into())));

        let overdue = wb.worksheet_range("En retard").unwrap();
        assert_eq!(overdue.height(), 2);
        assert_eq!(overdue.get((1, 0)), Some(&Data::String("P-1".into())));

        let kpi = wb.worksheet_range("Indicateurs").unwrap();
        assert_eq!(kpi.get((1, 1)), Some(&Data::Float(2.0)));
    }

    #[test]
    fn test_workbook_without_due_column() {
        let t = without_column(sample(), "Due date");
        let bytes = generate_report_workbook(&build_report(&t, dt("2024-06-01")), &t).unwrap();
        let mut wb: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let kpi = wb.worksheet_range("Indicateurs").unwrap();
        assert_eq!(kpi.get((3, 1)), Some(&Data::String("n/d".into())));
    }

    #[test]
    fn test_workbook_empty_table() {
        let t = table(vec![]);
        let bytes = generate_report_workbook(&build_report(&t, dt("2024-06-01")), &t).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
