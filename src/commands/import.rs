use std::path::Path;

use serde::Serialize;

use crate::analyzer::filter::FilterOptions;
use crate::analyzer::metrics::is_closed;
use crate::error::LoadError;
use crate::parser::types::ParseWarning;
use crate::state::{AppState, Session, SessionAccess, SourceId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub source_name: String,
    pub total_tickets: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub warnings: Vec<ParseWarning>,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub filter_options: FilterOptions,
    pub parse_duration_ms: u64,
    pub from_cache: bool,
}

/// Read `path` and load it into the session.
pub fn import_file(state: &AppState, path: &Path) -> Result<ImportResult, String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io(e).to_string())?;
    import_upload(state, &name, bytes)
}

/// Load an uploaded file into the session.
///
/// The same input (name, size and content) as the current session is served from
/// the cache. Anything else is parsed and replaces the session entirely; on
/// failure the previous session is left as it was.
pub fn import_upload(state: &AppState, name: &str, bytes: Vec<u8>) -> Result<ImportResult, String> {
    let source = SourceId::of(name, &bytes);

    let cached = state
        .session(|s| (s.source == source).then(|| s.import.clone()))
        .ok()
        .flatten();
    if let Some(mut result) = cached {
        log::info!("{} déjà chargé, réutilisation du cache", name);
        result.from_cache = true;
        return Ok(result);
    }

    let output = crate::parser::load_bytes(
        name,
        bytes,
        &state.config.sheet_name,
        &state.config.extra_date_formats,
    )
    .map_err(|e| e.to_string())?;

    let table = output.table;
    let filter_options = FilterOptions::from_table(&table);
    let closed_count = table
        .tickets
        .iter()
        .filter(|t| is_closed(t.status.as_deref()))
        .count();

    let import = ImportResult {
        source_name: name.to_string(),
        total_tickets: table.len(),
        open_count: table.len() - closed_count,
        closed_count,
        warnings: output.warnings,
        detected_columns: output.detected_columns,
        missing_optional_columns: output.missing_optional_columns,
        filter_options: filter_options.clone(),
        parse_duration_ms: output.parse_duration_ms,
        from_cache: false,
    };

    state.replace_session(Session {
        source,
        table,
        filter_options,
        import: import.clone(),
    })?;
    log::info!("Session remplacée par {}", name);

    Ok(import)
}
