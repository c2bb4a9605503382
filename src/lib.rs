pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod parser;
pub mod state;

pub use error::{AppError, LoadError};
pub use state::AppState;

// ─── E2E Integration Tests ──────────────────────────────────────────────────
