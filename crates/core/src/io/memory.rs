//! In-memory raster maps
//!
//! Used by tests and by callers that want to run the scanner without
//! touching disk.

use crate::error::{Error, Result};
use crate::io::{Geometry, RowSink, RowSource};
use crate::raster::{RowBuf, StorageKind};

/// An in-memory raster map.
///
/// Implements both [`RowSource`] and [`RowSink`]: as a source it serves
/// its stored rows, as a sink it appends rows until the declared
/// geometry is full.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    kind: StorageKind,
    geometry: Geometry,
    rows: Vec<RowBuf>,
}

impl MemoryRaster {
    /// Create an empty map ready to receive `geometry.rows` rows
    pub fn empty(kind: StorageKind, geometry: Geometry) -> Self {
        Self {
            kind,
            geometry,
            rows: Vec::with_capacity(geometry.rows),
        }
    }

    /// Create a map from fully materialized rows.
    ///
    /// All rows must share `kind` and have equal length.
    pub fn from_rows(kind: StorageKind, rows: Vec<RowBuf>) -> Result<Self> {
        let cols = rows.first().map_or(0, RowBuf::len);
        for row in &rows {
            if row.kind() != kind {
                return Err(Error::KindMismatch {
                    input: row.kind(),
                    output: kind,
                });
            }
            if row.len() != cols {
                return Err(Error::RowLengthMismatch {
                    got: row.len(),
                    expected: cols,
                });
            }
        }
        let geometry = Geometry::new(rows.len(), cols);
        Ok(Self {
            kind,
            geometry,
            rows,
        })
    }

    /// Create a map where every cell holds `value` narrowed to `kind`
    pub fn filled(kind: StorageKind, geometry: Geometry, value: f64) -> Self {
        let row = RowBuf::from_compute(kind, &vec![value; geometry.cols]);
        Self {
            kind,
            geometry,
            rows: vec![row; geometry.rows],
        }
    }

    /// The rows materialized so far
    pub fn rows(&self) -> &[RowBuf] {
        &self.rows
    }

    /// Number of rows written so far (equals `geometry.rows` when complete)
    pub fn rows_written(&self) -> usize {
        self.rows.len()
    }
}

impl RowSource for MemoryRaster {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn kind(&self) -> Result<StorageKind> {
        Ok(self.kind)
    }

    fn read_row(&mut self, row: usize, buf: &mut RowBuf) -> Result<()> {
        let stored = self.rows.get(row).ok_or(Error::RowOutOfRange {
            row,
            rows: self.geometry.rows,
        })?;
        *buf = stored.clone();
        Ok(())
    }
}

impl RowSink for MemoryRaster {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn kind(&self) -> StorageKind {
        self.kind
    }

    fn write_row(&mut self, row: &RowBuf) -> Result<()> {
        if self.rows.len() >= self.geometry.rows {
            return Err(Error::RowOutOfRange {
                row: self.rows.len(),
                rows: self.geometry.rows,
            });
        }
        if row.kind() != self.kind {
            return Err(Error::KindMismatch {
                input: row.kind(),
                output: self.kind,
            });
        }
        if row.len() != self.geometry.cols {
            return Err(Error::RowLengthMismatch {
                got: row.len(),
                expected: self.geometry.cols,
            });
        }
        self.rows.push(row.clone());
        Ok(())
    }
}

/// A [`RowSource`] test double that can fail on demand.
///
/// Wraps a [`MemoryRaster`] and optionally fails at a fixed row index
/// or reports a raw storage kind code instead of the real kind.
#[derive(Debug)]
pub struct FailingSource {
    inner: MemoryRaster,
    fail_at_row: Option<usize>,
    kind_code: Option<u8>,
    reads: usize,
}

impl FailingSource {
    pub fn new(inner: MemoryRaster) -> Self {
        Self {
            inner,
            fail_at_row: None,
            kind_code: None,
            reads: 0,
        }
    }

    /// Make `read_row` fail with an I/O error at the given row index
    pub fn fail_at_row(mut self, row: usize) -> Self {
        self.fail_at_row = Some(row);
        self
    }

    /// Report this raw storage kind code from `kind()` instead of the
    /// wrapped map's kind
    pub fn with_kind_code(mut self, code: u8) -> Self {
        self.kind_code = Some(code);
        self
    }

    /// Number of `read_row` calls made so far
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl RowSource for FailingSource {
    fn geometry(&self) -> Geometry {
        self.inner.geometry
    }

    fn kind(&self) -> Result<StorageKind> {
        match self.kind_code {
            Some(code) => StorageKind::from_code(code),
            None => Ok(self.inner.kind),
        }
    }

    fn read_row(&mut self, row: usize, buf: &mut RowBuf) -> Result<()> {
        self.reads += 1;
        if self.fail_at_row == Some(row) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("simulated read failure at row {}", row),
            )));
        }
        self.inner.read_row(row, buf)
    }
}
