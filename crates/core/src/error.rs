//! Error types for GridKit

use crate::raster::StorageKind;
use thiserror::Error;

/// Main error type for GridKit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("raster map <{name}> not found")]
    NotFound { name: String },

    #[error("cannot open raster map <{name}>: {reason}")]
    Open { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported storage kind code: {0}")]
    UnsupportedStorageKind(u8),

    #[error("corrupt raster map: {reason}")]
    CorruptRaster { reason: String },

    #[error("geometry mismatch: input {in_rows}x{in_cols}, output {out_rows}x{out_cols}")]
    GeometryMismatch {
        in_rows: usize,
        in_cols: usize,
        out_rows: usize,
        out_cols: usize,
    },

    #[error("storage kind mismatch: input {input}, output {output}")]
    KindMismatch {
        input: StorageKind,
        output: StorageKind,
    },

    #[error("row {row} out of range (raster has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column {col} out of range (row has {cols} columns)")]
    ColumnOutOfRange { col: usize, cols: usize },

    #[error("non-sequential row access: expected row {expected}, got {got}")]
    NonSequentialRow { expected: usize, got: usize },

    #[error("row length {got} does not match raster width {expected}")]
    RowLengthMismatch { got: usize, expected: usize },

    #[error("raster map <{name}> incomplete: wrote {written} of {expected} rows")]
    Incomplete {
        name: String,
        written: usize,
        expected: usize,
    },

    #[error("invalid history record: {reason}")]
    InvalidHistory { reason: String },

    #[error("scan cancelled")]
    Cancelled,
}

/// Result type alias for GridKit operations
pub type Result<T> = std::result::Result<T, Error>;
