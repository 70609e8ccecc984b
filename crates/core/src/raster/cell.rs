//! Typed cell values and storage kinds

use crate::error::{Error, Result};
use std::fmt;

/// Numeric representation of the cells in a raster map.
///
/// Fixed for the lifetime of one map; every cell of a map has the same
/// storage kind. The on-disk type codes are stable and part of the
/// raster container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// 32-bit signed integer cells
    Int,
    /// Single-precision floating point cells
    Float,
    /// Double-precision floating point cells
    Double,
}

impl StorageKind {
    /// All recognized storage kinds
    pub const ALL: [StorageKind; 3] = [StorageKind::Int, StorageKind::Float, StorageKind::Double];

    /// Decode an on-disk type code.
    ///
    /// Any code outside the three recognized kinds is an
    /// [`Error::UnsupportedStorageKind`].
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(StorageKind::Int),
            1 => Ok(StorageKind::Float),
            2 => Ok(StorageKind::Double),
            other => Err(Error::UnsupportedStorageKind(other)),
        }
    }

    /// The on-disk type code for this kind
    pub fn code(self) -> u8 {
        match self {
            StorageKind::Int => 0,
            StorageKind::Float => 1,
            StorageKind::Double => 2,
        }
    }

    /// Size of one cell of this kind in bytes
    pub fn cell_size_bytes(self) -> usize {
        match self {
            StorageKind::Int => 4,
            StorageKind::Float => 4,
            StorageKind::Double => 8,
        }
    }

    /// Whether this kind stores floating point samples
    pub fn is_float(self) -> bool {
        !matches!(self, StorageKind::Int)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageKind::Int => "int",
            StorageKind::Float => "float",
            StorageKind::Double => "double",
        };
        write!(f, "{}", s)
    }
}

/// One raster cell sample, tagged by its storage kind.
///
/// The active variant always matches the declared kind of the map the
/// value came from. Transforms run in the double-precision compute
/// domain; [`CellValue::to_compute`] and [`CellValue::from_compute`] are
/// the only conversions between stored and computed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Int(i32),
    Float(f32),
    Double(f64),
}

impl CellValue {
    /// The storage kind of this value
    pub fn kind(self) -> StorageKind {
        match self {
            CellValue::Int(_) => StorageKind::Int,
            CellValue::Float(_) => StorageKind::Float,
            CellValue::Double(_) => StorageKind::Double,
        }
    }

    /// Widen the stored sample to the double-precision compute domain.
    ///
    /// Always exact: `i32` and `f32` widen losslessly, `f64` passes
    /// through unchanged.
    pub fn to_compute(self) -> f64 {
        match self {
            CellValue::Int(v) => v as f64,
            CellValue::Float(v) => v as f64,
            CellValue::Double(v) => v,
        }
    }

    /// Narrow a computed double back into the target storage kind.
    ///
    /// `Int` truncates toward zero, saturating at the `i32` range bounds
    /// (NaN becomes 0). `Float` narrows with possible precision loss.
    /// `Double` passes through unchanged.
    pub fn from_compute(value: f64, kind: StorageKind) -> CellValue {
        match kind {
            StorageKind::Int => CellValue::Int(value as i32),
            StorageKind::Float => CellValue::Float(value as f32),
            StorageKind::Double => CellValue::Double(value),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Double(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in StorageKind::ALL {
            assert_eq!(StorageKind::from_code(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_code() {
        assert!(matches!(
            StorageKind::from_code(9),
            Err(Error::UnsupportedStorageKind(9))
        ));
    }

    #[test]
    fn test_compute_round_trip_is_exact() {
        let cases = [
            CellValue::Int(0),
            CellValue::Int(-12345),
            CellValue::Int(i32::MAX),
            CellValue::Int(i32::MIN),
            CellValue::Float(1.5),
            CellValue::Float(-0.25),
            CellValue::Double(0.1),
            CellValue::Double(-1e300),
        ];
        for v in cases {
            assert_eq!(CellValue::from_compute(v.to_compute(), v.kind()), v);
        }
    }

    #[test]
    fn test_int_narrowing_truncates_toward_zero() {
        assert_eq!(
            CellValue::from_compute(2.9, StorageKind::Int),
            CellValue::Int(2)
        );
        assert_eq!(
            CellValue::from_compute(-2.9, StorageKind::Int),
            CellValue::Int(-2)
        );
        assert_eq!(
            CellValue::from_compute(-0.5, StorageKind::Int),
            CellValue::Int(0)
        );
    }

    #[test]
    fn test_int_narrowing_saturates() {
        assert_eq!(
            CellValue::from_compute(1e12, StorageKind::Int),
            CellValue::Int(i32::MAX)
        );
        assert_eq!(
            CellValue::from_compute(-1e12, StorageKind::Int),
            CellValue::Int(i32::MIN)
        );
    }

    #[test]
    fn test_double_passes_through() {
        let v = 0.1 + 0.2;
        assert_eq!(
            CellValue::from_compute(v, StorageKind::Double),
            CellValue::Double(v)
        );
    }
}
