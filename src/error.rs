use thiserror::Error;

/// Échec de chargement du fichier source. Aucune table partielle n'est produite.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Fichier illisible: {0}")]
    Io(#[from] std::io::Error),

    #[error("Classeur invalide: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Erreur CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Feuille introuvable: {sheet:?} (feuilles disponibles: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Colonnes obligatoires manquantes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Fichier vide ou sans données")]
    EmptyFile,

    #[error("Format de fichier non supporté: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Erreur de sérialisation: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Aucun fichier chargé")]
    NoSession,

    #[error("{0}")]
    Custom(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
