use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error), // Converts io::Error into StockError automatically

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError), // Converts rusqlite::Error automatically

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Export error: {0}")]
    ExportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    Validation(String), // Missing or malformed request input

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String), // Duplicate IMEI, or a sale against an item that is already sold

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

impl StockError {
    /// True for failures of the durable store rather than of the request.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            StockError::IoError(_) | StockError::DatabaseError(_) | StockError::PoolError(_)
        )
    }
}
