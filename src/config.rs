use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_SHEET_NAME: &str = "Your Jira Issues";
pub const DEFAULT_INPUT: &str = "TestJIRA.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Feuille du classeur contenant les tickets.
    pub sheet_name: String,
    /// Fichier chargé quand aucun chemin n'est fourni.
    pub default_input: String,
    /// Formats chrono supplémentaires, essayés après les formats intégrés.
    pub extra_date_formats: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            default_input: DEFAULT_INPUT.to_string(),
            extra_date_formats: Vec::new(),
        }
    }
}

/// Load the configuration from an optional JSON file.
/// Missing or malformed keys keep their default value; unknown keys are ignored.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config = config_from_json(&raw)?;
    log::info!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

pub fn config_from_json(raw: &str) -> Result<AppConfig, AppError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let mut config = AppConfig::default();

    let Some(map) = value.as_object() else {
        return Err(AppError::Custom(
            "La configuration doit être un objet JSON".to_string(),
        ));
    };

    for (key, value) in map {
        match key.as_str() {
            "sheetName" => {
                if let Some(s) = value.as_str().filter(|s| !s.trim().is_empty()) {
                    config.sheet_name = s.to_string();
                }
            }
            "defaultInput" => {
                if let Some(s) = value.as_str().filter(|s| !s.trim().is_empty()) {
                    config.default_input = s.to_string();
                }
            }
            "extraDateFormats" => {
                if let Ok(v) = serde_json::from_value(value.clone()) {
                    config.extra_date_formats = v;
                }
            }
            other => log::debug!("Clé de configuration ignorée: {}", other),
        }
    }

    Ok(config)
}
