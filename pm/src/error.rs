//! Migration error types

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrateError>;

/// Errors that abort a migration run
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("{0} não encontrada")]
    MissingDatabaseUrl(String),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("Database error")]
    Database(#[from] mysql::Error),

    #[error("{path}:{line}: invalid integer in {field}: {value:?}")]
    InvalidInteger {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },
}

impl MigrateError {
    /// Configuration errors are reported with a plain message and exit code 1
    pub fn is_configuration(&self) -> bool {
        matches!(self, MigrateError::MissingDatabaseUrl(_))
    }
}
