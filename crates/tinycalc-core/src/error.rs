//! Error types for tinycalc core.

use std::collections::TryReserveError;

use thiserror::Error;
use tinycalc_engine::engine::CellRef;

/// Errors that can occur while editing, loading or saving a sheet.
///
/// Formula problems are not errors: they evaluate to an error value stored in
/// the cell.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Cell {0} cannot be saved: content spans multiple lines")]
    MultilineContent(CellRef),

    #[error("Out of memory")]
    OutOfMemory(#[from] TryReserveError),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, CoreError>;
