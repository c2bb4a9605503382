use std::collections::HashMap;

use crate::error::LoadError;
use crate::parser::types::CellValue;

pub const KEY: &str = "Key";
pub const SUMMARY: &str = "Summary";
pub const ISSUE_TYPE: &str = "Issue Type";
pub const STATUS: &str = "Status";
pub const PRIORITY: &str = "Priority";
pub const ASSIGNEE: &str = "Assignee";
pub const CREATED: &str = "Created";
pub const UPDATED: &str = "Updated";
pub const DUE_DATE: &str = "Due date";
pub const RESOLUTION_DATE: &str = "Resolution Date";

/// Colonnes obligatoires : le chargement échoue si l'une d'elles est absente.
const REQUIRED: &[&str] = &[KEY, SUMMARY, ISSUE_TYPE, STATUS, PRIORITY, ASSIGNEE];

/// Colonnes optionnelles : si absentes, fonctionnalités dépendantes désactivées.
const OPTIONAL: &[&str] = &[CREATED, UPDATED, DUE_DATE, RESOLUTION_DATE];

/// Columns coerced to timestamps when present.
pub const DATE_COLUMNS: &[&str] = &[CREATED, UPDATED, DUE_DATE, RESOLUTION_DATE];

/// Maps column names to their index in a row.
pub struct ColumnMap {
    indices: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    /// Build a ColumnMap from the header row.
    /// Names are trimmed; a repeated name gets a `.1`, `.2`… suffix so every
    /// column stays addressable.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut indices = HashMap::new();
        let mut header_list = Vec::with_capacity(headers.len());
        for (i, field) in headers.iter().enumerate() {
            let base = field.trim().to_string();
            let mut name = base.clone();
            let mut n = 1;
            while indices.contains_key(&name) {
                name = format!("{}.{}", base, n);
                n += 1;
            }
            indices.insert(name.clone(), i);
            header_list.push(name);
        }
        ColumnMap {
            indices,
            headers: header_list,
        }
    }

    pub fn index(&self, col: &str) -> Option<usize> {
        self.indices.get(col).copied()
    }

    /// Get the value of a named column from a row.
    pub fn get<'a>(&self, row: &'a [CellValue], col: &str) -> Option<&'a CellValue> {
        self.index(col).and_then(|i| row.get(i))
    }

    pub fn has(&self, col: &str) -> bool {
        self.indices.contains_key(col)
    }

    /// All header names in order.
    pub fn all_headers(&self) -> &[String] {
        &self.headers
    }
}

#[derive(Debug)]
pub struct ColumnValidation {
    pub present: Vec<String>,
    pub missing_optional: Vec<String>,
}

/// Returns `LoadError::MissingColumns` if any required column is absent.
pub fn validate_columns(col_map: &ColumnMap) -> Result<ColumnValidation, LoadError> {
    let missing_required: Vec<String> = REQUIRED
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    if !missing_required.is_empty() {
        return Err(LoadError::MissingColumns(missing_required));
    }

    let missing_optional = OPTIONAL
        .iter()
        .filter(|&&c| !col_map.has(c))
        .map(|c| c.to_string())
        .collect();

    Ok(ColumnValidation {
        present: col_map.all_headers().to_vec(),
        missing_optional,
    })
}
