//! Single-pass row scanner
//!
//! Drives the read/transform/write loop over a whole raster map: every
//! row is read from a source, every cell is mapped through a transform
//! in the double-precision compute domain, and the resulting row is
//! appended to a sink, in strict row order.

use crate::error::{Error, Result};
use crate::io::{RowSink, RowSource};
use crate::raster::{CellValue, RowBuf, StorageKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The demonstration transform: multiply a cell value by two
pub fn times_two(x: f64) -> f64 {
    2.0 * x
}

/// Shared flag to cancel a running scan between rows.
///
/// A cancelled scan returns [`Error::Cancelled`] and leaves whatever
/// was written so far in the sink; discarding it is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Summary of a completed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub rows: usize,
    pub cols: usize,
    pub kind: StorageKind,
}

/// The row scanner.
///
/// Borrows a source and a sink for the duration of one scan and owns no
/// raster data beyond two row buffers, so peak extra memory is
/// proportional to the column count, not the map size.
pub struct RowScanner<'a> {
    progress: Option<Box<dyn FnMut(usize, usize) + 'a>>,
    cancel: Option<CancelToken>,
}

impl Default for RowScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RowScanner<'a> {
    pub fn new() -> Self {
        Self {
            progress: None,
            cancel: None,
        }
    }

    /// Observe progress as `(rows_done, rows_total)` once per row.
    ///
    /// Purely observational; the hook never affects the scan result.
    pub fn on_progress(mut self, hook: impl FnMut(usize, usize) + 'a) -> Self {
        self.progress = Some(Box::new(hook));
        self
    }

    /// Check this token between rows and abort if it is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scan the whole map from `source` into `sink`, applying `f` to
    /// every cell in the compute domain.
    ///
    /// Preconditions, checked before row 0 is read: the source kind
    /// must decode to a recognized [`StorageKind`], and source and sink
    /// must agree on geometry and kind. A failed row read or write
    /// aborts the scan; rows already written stay in the sink.
    pub fn scan<S, K, F>(mut self, source: &mut S, sink: &mut K, f: F) -> Result<ScanReport>
    where
        S: RowSource,
        K: RowSink,
        F: Fn(f64) -> f64,
    {
        let kind = source.kind()?;
        if kind != sink.kind() {
            return Err(Error::KindMismatch {
                input: kind,
                output: sink.kind(),
            });
        }
        let src = source.geometry();
        let dst = sink.geometry();
        if src != dst {
            return Err(Error::GeometryMismatch {
                in_rows: src.rows,
                in_cols: src.cols,
                out_rows: dst.rows,
                out_cols: dst.cols,
            });
        }

        let mut row_in = RowBuf::zeros(kind, src.cols);
        let mut row_out = RowBuf::zeros(kind, src.cols);

        for row in 0..src.rows {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }
            if let Some(hook) = &mut self.progress {
                hook(row, src.rows);
            }

            source.read_row(row, &mut row_in)?;
            for col in 0..src.cols {
                let value = row_in.get(col)?.to_compute();
                row_out.set(col, CellValue::from_compute(f(value), kind))?;
            }
            sink.write_row(&row_out)?;
        }

        if let Some(hook) = &mut self.progress {
            hook(src.rows, src.rows);
        }

        Ok(ScanReport {
            rows: src.rows,
            cols: src.cols,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FailingSource, Geometry, MemoryRaster};

    fn int_map(rows: &[&[i32]]) -> MemoryRaster {
        let rows = rows
            .iter()
            .map(|r| RowBuf::Int(r.to_vec()))
            .collect();
        MemoryRaster::from_rows(StorageKind::Int, rows).unwrap()
    }

    #[test]
    fn test_times_two_int_map() {
        // 2x2 integer map [[1,2],[3,4]] doubles to [[2,4],[6,8]]
        let mut source = int_map(&[&[1, 2], &[3, 4]]);
        let mut sink = MemoryRaster::empty(StorageKind::Int, Geometry::new(2, 2));

        let report = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.cols, 2);
        assert_eq!(report.kind, StorageKind::Int);
        assert_eq!(
            sink.rows(),
            &[RowBuf::Int(vec![2, 4]), RowBuf::Int(vec![6, 8])]
        );
    }

    #[test]
    fn test_times_two_double_map() {
        let source_rows = vec![RowBuf::Double(vec![0.5, -1.25, 100.0])];
        let mut source = MemoryRaster::from_rows(StorageKind::Double, source_rows).unwrap();
        let mut sink = MemoryRaster::empty(StorageKind::Double, Geometry::new(1, 3));

        RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap();

        assert_eq!(sink.rows(), &[RowBuf::Double(vec![1.0, -2.5, 200.0])]);
    }

    #[test]
    fn test_uniform_map_all_kinds() {
        for kind in StorageKind::ALL {
            let geometry = Geometry::new(3, 4);
            let mut source = MemoryRaster::filled(kind, geometry, 7.0);
            let mut sink = MemoryRaster::empty(kind, geometry);

            RowScanner::new()
                .scan(&mut source, &mut sink, times_two)
                .unwrap();

            let expected = CellValue::from_compute(2.0 * 7.0, kind);
            assert_eq!(sink.rows_written(), 3);
            for row in sink.rows() {
                assert!(row.cells().all(|c| c == expected));
            }
        }
    }

    #[test]
    fn test_row_order_preserved() {
        // Identity transform: output row i must equal input row i
        let mut source = int_map(&[&[10, 11], &[20, 21], &[30, 31]]);
        let mut sink = MemoryRaster::empty(StorageKind::Int, Geometry::new(3, 2));

        RowScanner::new()
            .scan(&mut source, &mut sink, |x| x)
            .unwrap();

        assert_eq!(sink.rows(), source.rows());
    }

    #[test]
    fn test_empty_map() {
        let mut source = MemoryRaster::empty(StorageKind::Float, Geometry::new(0, 0));
        let mut sink = MemoryRaster::empty(StorageKind::Float, Geometry::new(0, 0));

        let report = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap();

        assert_eq!(report.rows, 0);
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn test_read_failure_aborts_mid_scan() {
        // Read fails at row 5 of 10: rows 0-4 are written, 6-9 never read
        let geometry = Geometry::new(10, 2);
        let source = MemoryRaster::filled(StorageKind::Int, geometry, 1.0);
        let mut source = FailingSource::new(source).fail_at_row(5);
        let mut sink = MemoryRaster::empty(StorageKind::Int, geometry);

        let err = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert_eq!(sink.rows_written(), 5);
        assert_eq!(source.reads(), 6);
    }

    #[test]
    fn test_unsupported_kind_detected_before_any_read() {
        let geometry = Geometry::new(4, 4);
        let source = MemoryRaster::filled(StorageKind::Int, geometry, 1.0);
        let mut source = FailingSource::new(source).with_kind_code(9);
        let mut sink = MemoryRaster::empty(StorageKind::Int, geometry);

        let err = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedStorageKind(9)));
        assert_eq!(source.reads(), 0);
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let mut source = MemoryRaster::filled(StorageKind::Int, Geometry::new(2, 2), 1.0);
        let mut sink = MemoryRaster::empty(StorageKind::Int, Geometry::new(2, 3));

        let err = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap_err();

        assert!(matches!(err, Error::GeometryMismatch { .. }));
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let geometry = Geometry::new(2, 2);
        let mut source = MemoryRaster::filled(StorageKind::Int, geometry, 1.0);
        let mut sink = MemoryRaster::empty(StorageKind::Double, geometry);

        let err = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::KindMismatch {
                input: StorageKind::Int,
                output: StorageKind::Double,
            }
        ));
    }

    #[test]
    fn test_float_kind_preserved_through_compute_domain() {
        let source_rows = vec![RowBuf::Float(vec![0.5, 2.25])];
        let mut source = MemoryRaster::from_rows(StorageKind::Float, source_rows).unwrap();
        let mut sink = MemoryRaster::empty(StorageKind::Float, Geometry::new(1, 2));

        let report = RowScanner::new()
            .scan(&mut source, &mut sink, times_two)
            .unwrap();

        assert_eq!(report.kind, StorageKind::Float);
        assert_eq!(sink.rows(), &[RowBuf::Float(vec![1.0, 4.5])]);
    }

    #[test]
    fn test_int_transform_truncates_toward_zero() {
        let mut source = int_map(&[&[3, -3]]);
        let mut sink = MemoryRaster::empty(StorageKind::Int, Geometry::new(1, 2));

        // Halving an odd integer exercises the documented truncation
        RowScanner::new()
            .scan(&mut source, &mut sink, |x| x / 2.0)
            .unwrap();

        assert_eq!(sink.rows(), &[RowBuf::Int(vec![1, -1])]);
    }

    #[test]
    fn test_progress_hook_is_monotonic() {
        let geometry = Geometry::new(4, 1);
        let mut source = MemoryRaster::filled(StorageKind::Int, geometry, 1.0);
        let mut sink = MemoryRaster::empty(StorageKind::Int, geometry);

        let mut seen = Vec::new();
        RowScanner::new()
            .on_progress(|done, total| seen.push((done, total)))
            .scan(&mut source, &mut sink, times_two)
            .unwrap();

        assert_eq!(seen, vec![(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn test_cancelled_scan_writes_nothing() {
        let geometry = Geometry::new(4, 1);
        let mut source = MemoryRaster::filled(StorageKind::Int, geometry, 1.0);
        let mut sink = MemoryRaster::empty(StorageKind::Int, geometry);

        let token = CancelToken::new();
        token.cancel();

        let err = RowScanner::new()
            .with_cancel(token)
            .scan(&mut source, &mut sink, times_two)
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(sink.rows_written(), 0);
    }
}
