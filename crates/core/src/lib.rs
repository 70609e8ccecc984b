//! # GridKit Core
//!
//! Core types and I/O for the GridKit raster toolkit.
//!
//! This crate provides:
//! - `StorageKind` / `CellValue`: typed raster cell samples
//! - `RowBuf`: a one-row buffer of typed cells
//! - `RowScanner`: the single-pass read/transform/write loop
//! - `Workspace`: mapset-based raster map storage on disk
//! - `History`: provenance records for generated maps

pub mod error;
pub mod history;
pub mod io;
pub mod raster;
pub mod scan;

pub use error::{Error, Result};
pub use raster::{CellValue, RowBuf, StorageKind};
pub use scan::RowScanner;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::history::History;
    pub use crate::io::{Geometry, RowSink, RowSource, Workspace};
    pub use crate::raster::{CellValue, RowBuf, StorageKind};
    pub use crate::scan::{times_two, RowScanner};
}
