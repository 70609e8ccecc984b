//! Native on-disk raster map store
//!
//! A workspace is a directory whose children are mapsets. Each mapset
//! holds raster maps under `cell/<name>` and their provenance records
//! under `hist/<name>`.
//!
//! Map container format, little-endian:
//!
//! ```text
//! magic   4 bytes  "GKR1"
//! kind    1 byte   storage kind code
//! rows    8 bytes  u64
//! cols    8 bytes  u64
//! cells   rows * cols * cell_size, row-major
//! ```

use crate::error::{Error, Result};
use crate::history::History;
use crate::io::{Geometry, RowSink, RowSource};
use crate::raster::{RowBuf, StorageKind};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const MAGIC: &[u8; 4] = b"GKR1";

/// A directory of mapsets holding raster maps.
///
/// Plays the role of both the map locator and the map store: maps are
/// found by searching the mapset path and opened for sequential row
/// read or append-only row write.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    search_path: Option<Vec<String>>,
}

impl Workspace {
    /// Open an existing workspace directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::Open {
                name: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }
        Ok(Self {
            root,
            search_path: None,
        })
    }

    /// Create the workspace directory if missing and open it
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Self::open(root)
    }

    /// Restrict map lookup to these mapsets, in order.
    ///
    /// Without a search path, all mapsets are searched in name order.
    pub fn with_search_path(mut self, mapsets: Vec<String>) -> Self {
        self.search_path = Some(mapsets);
        self
    }

    /// Mapsets searched by [`Workspace::locate`], in order
    pub fn mapsets(&self) -> Result<Vec<String>> {
        if let Some(path) = &self.search_path {
            return Ok(path.clone());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Find the mapset containing the named raster map.
    ///
    /// Returns the first match along the search path, or
    /// [`Error::NotFound`] if no mapset has the map.
    pub fn locate(&self, name: &str) -> Result<String> {
        for mapset in self.mapsets()? {
            if self.cell_path(name, &mapset).is_file() {
                debug!("located raster map <{}> in mapset <{}>", name, mapset);
                return Ok(mapset);
            }
        }
        Err(Error::NotFound {
            name: name.to_string(),
        })
    }

    /// Open a raster map for sequential row reading
    pub fn open_for_read(&self, name: &str, mapset: &str) -> Result<RasterReader> {
        let path = self.cell_path(name, mapset);
        let file = File::open(&path).map_err(|e| Error::Open {
            name: format!("{}@{}", name, mapset),
            reason: e.to_string(),
        })?;
        let mut file = BufReader::new(file);

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(Error::CorruptRaster {
                reason: format!("<{}@{}> has bad magic", name, mapset),
            });
        }
        // The kind code is kept raw here; RasterReader::kind decodes it
        // so an unrecognized code surfaces before the first row read.
        let kind_code = file.read_u8()?;
        let rows = file.read_u64::<LittleEndian>()? as usize;
        let cols = file.read_u64::<LittleEndian>()? as usize;
        debug!(
            "opened raster map <{}@{}>: {} x {} (kind code {})",
            name, mapset, rows, cols, kind_code
        );

        Ok(RasterReader {
            file,
            name: name.to_string(),
            geometry: Geometry::new(rows, cols),
            kind_code,
            next_row: 0,
        })
    }

    /// Create a raster map for append-only row writing.
    ///
    /// The mapset is created if missing. The map is complete only after
    /// [`RasterWriter::finish`]; an abandoned writer leaves a partial
    /// map behind.
    pub fn open_for_write(
        &self,
        name: &str,
        mapset: &str,
        kind: StorageKind,
        geometry: Geometry,
    ) -> Result<RasterWriter> {
        fs::create_dir_all(self.root.join(mapset).join("cell"))?;
        let path = self.cell_path(name, mapset);
        let file = File::create(&path).map_err(|e| Error::Open {
            name: format!("{}@{}", name, mapset),
            reason: e.to_string(),
        })?;
        let mut file = BufWriter::new(file);

        file.write_all(MAGIC)?;
        file.write_u8(kind.code())?;
        file.write_u64::<LittleEndian>(geometry.rows as u64)?;
        file.write_u64::<LittleEndian>(geometry.cols as u64)?;

        Ok(RasterWriter {
            file,
            name: name.to_string(),
            geometry,
            kind,
            rows_written: 0,
        })
    }

    /// Record how the named map was produced.
    ///
    /// Provenance is advisory: a failure here does not invalidate the
    /// written map data.
    pub fn write_history(&self, name: &str, mapset: &str, history: &History) -> Result<()> {
        let dir = self.root.join(mapset).join("hist");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(name), history.to_record())?;
        Ok(())
    }

    /// Read the provenance record of the named map, if any
    pub fn read_history(&self, name: &str, mapset: &str) -> Result<Option<History>> {
        let path = self.root.join(mapset).join("hist").join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        History::parse(&text).map(Some)
    }

    fn cell_path(&self, name: &str, mapset: &str) -> PathBuf {
        self.root.join(mapset).join("cell").join(name)
    }
}

/// Sequential row reader over one on-disk raster map
#[derive(Debug)]
pub struct RasterReader {
    file: BufReader<File>,
    name: String,
    geometry: Geometry,
    kind_code: u8,
    next_row: usize,
}

impl RasterReader {
    /// Name of the map this reader was opened on
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RowSource for RasterReader {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn kind(&self) -> Result<StorageKind> {
        StorageKind::from_code(self.kind_code)
    }

    fn read_row(&mut self, row: usize, buf: &mut RowBuf) -> Result<()> {
        if row >= self.geometry.rows {
            return Err(Error::RowOutOfRange {
                row,
                rows: self.geometry.rows,
            });
        }
        if row != self.next_row {
            return Err(Error::NonSequentialRow {
                expected: self.next_row,
                got: row,
            });
        }
        let kind = self.kind()?;
        let cols = self.geometry.cols;
        *buf = match kind {
            StorageKind::Int => {
                let mut cells = vec![0i32; cols];
                self.file.read_i32_into::<LittleEndian>(&mut cells)?;
                RowBuf::Int(cells)
            }
            StorageKind::Float => {
                let mut cells = vec![0f32; cols];
                self.file.read_f32_into::<LittleEndian>(&mut cells)?;
                RowBuf::Float(cells)
            }
            StorageKind::Double => {
                let mut cells = vec![0f64; cols];
                self.file.read_f64_into::<LittleEndian>(&mut cells)?;
                RowBuf::Double(cells)
            }
        };
        self.next_row += 1;
        Ok(())
    }
}

/// Append-only row writer creating one on-disk raster map
#[derive(Debug)]
pub struct RasterWriter {
    file: BufWriter<File>,
    name: String,
    geometry: Geometry,
    kind: StorageKind,
    rows_written: usize,
}

impl RasterWriter {
    /// Name of the map this writer is creating
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows appended so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and complete the map.
    ///
    /// Fails if fewer rows were written than the declared geometry
    /// requires; the partial map stays on disk for the caller to
    /// discard.
    pub fn finish(mut self) -> Result<()> {
        if self.rows_written != self.geometry.rows {
            return Err(Error::Incomplete {
                name: self.name.clone(),
                written: self.rows_written,
                expected: self.geometry.rows,
            });
        }
        self.file.flush()?;
        Ok(())
    }
}

impl RowSink for RasterWriter {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn kind(&self) -> StorageKind {
        self.kind
    }

    fn write_row(&mut self, row: &RowBuf) -> Result<()> {
        if self.rows_written >= self.geometry.rows {
            return Err(Error::RowOutOfRange {
                row: self.rows_written,
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
        match row {
            RowBuf::Int(cells) => {
                for &v in cells {
                    self.file.write_i32::<LittleEndian>(v)?;
                }
            }
            RowBuf::Float(cells) => {
                for &v in cells {
                    self.file.write_f32::<LittleEndian>(v)?;
                }
            }
            RowBuf::Double(cells) => {
                for &v in cells {
                    self.file.write_f64::<LittleEndian>(v)?;
                }
            }
        }
        self.rows_written += 1;
        Ok(())
    }
}
