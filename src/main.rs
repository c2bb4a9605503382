use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use env_logger::Env;
use log::error;

use jira_report_lib::analyzer::{FilterSelection, TicketReport};
use jira_report_lib::commands::{export, import, report};
use jira_report_lib::config;
use jira_report_lib::state::AppState;

#[derive(Parser, Debug)]
#[command(version, about = "Jira ticket report: filter an issue export, show key metrics", long_about = None)]
struct Args {
    /// Ticket export (.xlsx or .csv); defaults to `defaultInput` from the configuration
    file: Option<PathBuf>,

    #[arg(long = "config", help = "JSON configuration file")]
    config: Option<PathBuf>,

    #[arg(long = "sheet", help = "sheet holding the tickets, e.g. \"Your Jira Issues\"")]
    sheet: Option<String>,

    #[arg(long = "issue-type", value_name = "TYPE", help = "keep only these issue types (repeatable)")]
    issue_types: Vec<String>,

    #[arg(long = "status", value_name = "STATUS", help = "keep only these statuses (repeatable)")]
    statuses: Vec<String>,

    #[arg(long = "priority", value_name = "PRIORITY", help = "keep only these priorities (repeatable)")]
    priorities: Vec<String>,

    #[arg(
        long = "assignee",
        value_name = "NAME",
        help = "keep only these assignees (repeatable); unassigned tickets are always kept"
    )]
    assignees: Vec<String>,

    #[arg(long = "csv-out", help = "write the filtered rows as CSV (file or directory)")]
    csv_out: Option<PathBuf>,

    #[arg(long = "xlsx-out", help = "write the Excel report")]
    xlsx_out: Option<PathBuf>,

    #[arg(long = "json", action = ArgAction::SetTrue, help = "print the report as JSON")]
    json: bool,
}

/// A selector given on the command line replaces the default (every value).
fn override_with(target: &mut BTreeSet<String>, values: &[String]) {
    if !values.is_empty() {
        *target = values.iter().cloned().collect();
    }
}

fn print_report(r: &TicketReport) {
    println!("Tickets filtrés: {}", r.tickets.rows.len());
    let overdue = r
        .metrics
        .overdue
        .map_or("n/d".to_string(), |n| n.to_string());
    println!(
        "Total: {} | Ouverts: {} | En retard: {} | Fermés: {}",
        r.metrics.total, r.metrics.open, overdue, r.metrics.closed
    );

    println!("\nRépartition par statut");
    for c in &r.status_distribution {
        println!("  {:<24} {:>5}", c.label, c.count);
    }
    println!("\nRépartition par priorité");
    for c in &r.priority_distribution {
        println!("  {:<24} {:>5}", c.label, c.count);
    }

    println!("\nTemps de résolution (jours)");
    match &r.resolution {
        None => println!("  Non disponible"),
        Some(res) => match res.average_days {
            None => println!("  Aucun ticket résolu avec date de résolution."),
            Some(avg) => {
                println!("  Moyenne: {:.1} jours", avg);
                for p in &res.series {
                    println!("  {:<16} {:>5}", p.key, p.resolution_days);
                }
            }
        },
    }

    println!("\nTickets en retard");
    match &r.overdue_tickets {
        None => println!("  Non disponible"),
        Some(rows) => {
            for t in rows {
                println!(
                    "  {} | {} | {} | {} | {} | {}",
                    t.key,
                    t.summary,
                    t.assignee.as_deref().unwrap_or(""),
                    t.priority.as_deref().unwrap_or(""),
                    t.due_date.format("%Y-%m-%d"),
                    t.status.as_deref().unwrap_or("")
                );
            }
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut config = config::load_config(args.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(sheet) = args.sheet.clone() {
        config.sheet_name = sheet;
    }
    let input = args
        .file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.default_input));
    let default_input = config.default_input.clone();

    let state = AppState::new(config);
    let imported = import::import_file(&state, &input).map_err(|e| {
        format!(
            "{}\nVeuillez fournir un fichier {} valide pour commencer.",
            e, default_input
        )
    })?;
    for w in &imported.warnings {
        log::warn!("ligne {}: {}", w.line, w.message);
    }

    let mut selection: FilterSelection = report::default_selection(&state)?;
    override_with(&mut selection.issue_types, &args.issue_types);
    override_with(&mut selection.statuses, &args.statuses);
    override_with(&mut selection.priorities, &args.priorities);
    override_with(&mut selection.assignees, &args.assignees);

    let ticket_report = report::get_report(&state, &selection)?;
    if args.json {
        let json = serde_json::to_string_pretty(&ticket_report).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        print_report(&ticket_report);
    }

    if let Some(out) = &args.csv_out {
        let download = export::export_filtered_csv(&state, &selection)?;
        let path = if out.is_dir() {
            out.join(&download.file_name)
        } else {
            out.clone()
        };
        std::fs::write(&path, &download.bytes).map_err(|e| e.to_string())?;
        log::info!("CSV écrit: {}", path.display());
    }

    if let Some(out) = &args.xlsx_out {
        export::export_excel_report(&state, &selection, out)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
