use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use crate::analyzer::filter::FilterOptions;
use crate::commands::import::ImportResult;
use crate::config::AppConfig;
use crate::parser::types::TicketTable;

/// Identity of an input file: same name, size and content hash = same input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    pub name: String,
    pub size_bytes: u64,
    pub fingerprint: u64,
}

impl SourceId {
    pub fn of(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        SourceId {
            name: name.to_string(),
            size_bytes: bytes.len() as u64,
            fingerprint: hasher.finish(),
        }
    }
}

/// Table loaded for the current session. Replaced as a whole on every new upload.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: SourceId,
    pub table: TicketTable,
    pub filter_options: FilterOptions,
    pub import: ImportResult,
}

pub struct AppState {
    pub config: AppConfig,
    pub session: Mutex<Option<Session>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config,
            session: Mutex::new(None),
        }
    }
}

pub trait SessionAccess {
    fn session<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Session) -> T;

    /// Install `session`, dropping whatever was loaded before.
    fn replace_session(&self, session: Session) -> Result<(), String>;
}

impl SessionAccess for AppState {
    fn session<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Session) -> T,
    {
        let guard = self
            .session
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;
        let session = guard
            .as_ref()
            .ok_or_else(|| crate::error::AppError::NoSession.to_string())?;
        Ok(f(session))
    }

    fn replace_session(&self, session: Session) -> Result<(), String> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;
        *guard = Some(session);
        Ok(())
    }
}
