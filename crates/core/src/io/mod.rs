//! Raster map I/O: row source/sink traits, the native workspace store
//! and an in-memory store

mod memory;
mod native;

pub use memory::{FailingSource, MemoryRaster};
pub use native::{RasterReader, RasterWriter, Workspace};

use crate::error::Result;
use crate::raster::{RowBuf, StorageKind};

/// Raster geometry: row and column counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: usize,
    pub cols: usize,
}

impl Geometry {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// A readable raster map, consumed one row at a time.
///
/// Rows are read in strictly increasing order starting at 0; sources
/// are not required to support random access.
pub trait RowSource {
    /// Row and column counts of the map
    fn geometry(&self) -> Geometry;

    /// The storage kind of the map.
    ///
    /// Sources backed by external storage may only discover here that
    /// the map declares a kind outside the recognized set, so this is
    /// fallible.
    fn kind(&self) -> Result<StorageKind>;

    /// Read row `row` into `buf`, replacing its contents
    fn read_row(&mut self, row: usize, buf: &mut RowBuf) -> Result<()>;
}

/// A writable raster map, filled one row at a time, append-only.
pub trait RowSink {
    /// Row and column counts of the map
    fn geometry(&self) -> Geometry;

    /// The storage kind the map was created with
    fn kind(&self) -> StorageKind;

    /// Append the next row to the map
    fn write_row(&mut self, row: &RowBuf) -> Result<()>;
}
