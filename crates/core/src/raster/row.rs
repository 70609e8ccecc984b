//! One-row buffers of typed cells

use crate::error::{Error, Result};
use crate::raster::{CellValue, StorageKind};

/// A buffer holding one raster row of a single storage kind.
///
/// Length equals the raster column count; index `c` corresponds to
/// spatial column `c`, left to right. Storing cells unboxed per kind
/// keeps a row contiguous in memory while the API still speaks in
/// tagged [`CellValue`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum RowBuf {
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl RowBuf {
    /// Create a zero-filled row of the given kind and length
    pub fn zeros(kind: StorageKind, len: usize) -> Self {
        match kind {
            StorageKind::Int => RowBuf::Int(vec![0; len]),
            StorageKind::Float => RowBuf::Float(vec![0.0; len]),
            StorageKind::Double => RowBuf::Double(vec![0.0; len]),
        }
    }

    /// Build a row by narrowing compute-domain values into the given kind
    pub fn from_compute(kind: StorageKind, values: &[f64]) -> Self {
        match kind {
            StorageKind::Int => RowBuf::Int(values.iter().map(|&v| v as i32).collect()),
            StorageKind::Float => RowBuf::Float(values.iter().map(|&v| v as f32).collect()),
            StorageKind::Double => RowBuf::Double(values.to_vec()),
        }
    }

    /// The storage kind of this row
    pub fn kind(&self) -> StorageKind {
        match self {
            RowBuf::Int(_) => StorageKind::Int,
            RowBuf::Float(_) => StorageKind::Float,
            RowBuf::Double(_) => StorageKind::Double,
        }
    }

    /// Number of cells in the row
    pub fn len(&self) -> usize {
        match self {
            RowBuf::Int(v) => v.len(),
            RowBuf::Float(v) => v.len(),
            RowBuf::Double(v) => v.len(),
        }
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the cell at `col`
    pub fn get(&self, col: usize) -> Result<CellValue> {
        if col >= self.len() {
            return Err(Error::ColumnOutOfRange {
                col,
                cols: self.len(),
            });
        }
        Ok(match self {
            RowBuf::Int(v) => CellValue::Int(v[col]),
            RowBuf::Float(v) => CellValue::Float(v[col]),
            RowBuf::Double(v) => CellValue::Double(v[col]),
        })
    }

    /// Set the cell at `col`.
    ///
    /// The value's kind must match the row's kind; no implicit
    /// conversion happens here.
    pub fn set(&mut self, col: usize, value: CellValue) -> Result<()> {
        if col >= self.len() {
            return Err(Error::ColumnOutOfRange {
                col,
                cols: self.len(),
            });
        }
        match (self, value) {
            (RowBuf::Int(v), CellValue::Int(x)) => v[col] = x,
            (RowBuf::Float(v), CellValue::Float(x)) => v[col] = x,
            (RowBuf::Double(v), CellValue::Double(x)) => v[col] = x,
            (row, value) => {
                return Err(Error::KindMismatch {
                    input: value.kind(),
                    output: row.kind(),
                })
            }
        }
        Ok(())
    }

    /// Iterate over the cells of the row, left to right
    pub fn cells(&self) -> impl Iterator<Item = CellValue> + '_ {
        (0..self.len()).map(move |col| match self {
            RowBuf::Int(v) => CellValue::Int(v[col]),
            RowBuf::Float(v) => CellValue::Float(v[col]),
            RowBuf::Double(v) => CellValue::Double(v[col]),
        })
    }
}
