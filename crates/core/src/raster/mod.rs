//! Raster cell values, storage kinds and row buffers

mod cell;
mod row;

pub use cell::{CellValue, StorageKind};
pub use row::RowBuf;
