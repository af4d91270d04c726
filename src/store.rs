//! On-disk cache of generated noise channels.
//!
//! Generating a 128³ field of gradient noise is the slowest part of setup,
//! so channels can be saved once and reloaded on later runs. Files are named
//! `<channel>_<dimension>.perlin` for the first field and
//! `<channel>_<dimension>_<field index>.perlin` for the others, where
//! `dimension` is the bound along the channel's own axis.
//!
//! # File Format
//!
//! | Offset | Size | Content                                  |
//! |--------|------|------------------------------------------|
//! | 0      | 8    | magic `FLOWGRID`                         |
//! | 8      | 1    | element type (`1` = little-endian `f32`) |
//! | 9      | 3    | zero padding                             |
//! | 12     | 12   | `dim_x`, `dim_y`, `dim_z` as LE `u32`    |
//! | 24     | 4·N  | row-major values, X slowest, Z fastest   |

use crate::error::GridFormatError;
use crate::grid::{checked_cell_count, Axis, NoiseGrid};
use bytemuck::{Pod, Zeroable};
use glam::UVec3;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes at the start of every grid file.
pub const GRID_MAGIC: [u8; 8] = *b"FLOWGRID";

/// Element type tag for little-endian `f32` payloads.
pub const ELEMENT_F32: u8 = 1;

/// File extension used for cached channels.
pub const GRID_EXTENSION: &str = "perlin";

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct GridHeader {
    magic: [u8; 8],
    element: u8,
    _pad: [u8; 3],
    dims: [u32; 3],
}

impl GridHeader {
    fn for_dims(dims: UVec3) -> Self {
        Self {
            magic: GRID_MAGIC,
            element: ELEMENT_F32,
            _pad: [0; 3],
            dims: [dims.x.to_le(), dims.y.to_le(), dims.z.to_le()],
        }
    }

    fn dims(&self) -> UVec3 {
        UVec3::new(
            u32::from_le(self.dims[0]),
            u32::from_le(self.dims[1]),
            u32::from_le(self.dims[2]),
        )
    }
}

/// Serialize a grid to any writer.
pub fn write_grid<W: Write>(writer: &mut W, grid: &NoiseGrid) -> io::Result<()> {
    let header = GridHeader::for_dims(grid.dims());
    writer.write_all(bytemuck::bytes_of(&header))?;
    for value in grid.values() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Deserialize a grid from any reader.
pub fn read_grid<R: Read>(reader: &mut R) -> Result<NoiseGrid, GridFormatError> {
    let mut header_bytes = [0u8; std::mem::size_of::<GridHeader>()];
    reader.read_exact(&mut header_bytes)?;
    let header: GridHeader = bytemuck::pod_read_unaligned(&header_bytes);

    if header.magic != GRID_MAGIC {
        return Err(GridFormatError::BadMagic);
    }
    if header.element != ELEMENT_F32 {
        return Err(GridFormatError::UnsupportedElement(header.element));
    }

    let dims = header.dims();
    let (expected, expected_bytes) = checked_cell_count(dims)
        .and_then(|n| Some((n, n.checked_mul(4)?)))
        .ok_or(GridFormatError::DimsOverflow { dims: dims.to_array() })?;

    // Read at most one byte past the declared payload so a bogus header
    // cannot drive the allocation.
    let mut payload = Vec::new();
    reader
        .take(expected_bytes as u64 + 1)
        .read_to_end(&mut payload)?;

    if payload.len() != expected_bytes {
        return Err(GridFormatError::LengthMismatch {
            expected,
            found: payload.len() / 4,
        });
    }

    let values = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    NoiseGrid::from_values(dims, values)
}

/// Identifies one cached noise channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    /// Axis the channel drives.
    pub axis: Axis,
    /// Bound along that axis.
    pub dimension: u32,
    /// Position of the owning field in the pool.
    pub field_index: usize,
}

impl ChannelKey {
    /// Key for `axis` of the field at `field_index` in a volume of `bounds`.
    pub fn new(axis: Axis, bounds: UVec3, field_index: usize) -> Self {
        Self {
            axis,
            dimension: axis.of(bounds),
            field_index,
        }
    }

    /// File name for this channel. Field 0 carries no index suffix.
    pub fn file_name(&self) -> String {
        let channel = self.axis.channel_name();
        match self.field_index {
            0 => format!("{}_{}.{}", channel, self.dimension, GRID_EXTENSION),
            index => format!("{}_{}_{}.{}", channel, self.dimension, index, GRID_EXTENSION),
        }
    }
}

/// A directory of cached noise channels.
#[derive(Clone, Debug)]
pub struct NoiseStore {
    dir: PathBuf,
}

impl NoiseStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file for `key`.
    pub fn path_for(&self, key: &ChannelKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load a channel.
    ///
    /// Returns `Ok(None)` when no file exists, or when the stored grid has
    /// different dimensions than `expected_dims` (the caller regenerates in
    /// both cases). Corrupt files are reported as errors.
    pub fn load(&self, key: &ChannelKey, expected_dims: UVec3) -> Result<Option<NoiseGrid>, GridFormatError> {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cached {} at {}", key.axis.channel_name(), path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let grid = read_grid(&mut BufReader::new(file))?;
        if grid.dims() != expected_dims {
            info!(
                "Cached {} at {} has dims {} but {} is needed, ignoring",
                key.axis.channel_name(),
                path.display(),
                grid.dims(),
                expected_dims
            );
            return Ok(None);
        }
        Ok(Some(grid))
    }

    /// Save a channel, overwriting any existing file.
    pub fn save(&self, key: &ChannelKey, grid: &NoiseGrid) -> Result<PathBuf, GridFormatError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let mut writer = BufWriter::new(File::create(&path)?);
        write_grid(&mut writer, grid)?;
        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_grid() -> NoiseGrid {
        NoiseGrid::from_fn(UVec3::new(3, 2, 4), |c| c.x as f32 - 0.5 * c.y as f32 + 0.125 * c.z as f32)
    }

    #[test]
    fn test_header_is_24_bytes() {
        assert_eq!(std::mem::size_of::<GridHeader>(), 24);
    }

    #[test]
    fn test_write_layout() {
        let grid = sample_grid();
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &grid).unwrap();

        assert_eq!(&bytes[0..8], b"FLOWGRID");
        assert_eq!(bytes[8], ELEMENT_F32);
        assert_eq!(&bytes[12..16], &3u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &2u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &4u32.to_le_bytes());
        assert_eq!(bytes.len(), 24 + 24 * 4);

        // Second value in storage order is cell (0, 0, 1).
        assert_eq!(&bytes[28..32], &0.125f32.to_le_bytes());
    }

    #[test]
    fn test_read_back() {
        let grid = sample_grid();
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &grid).unwrap();

        let loaded = read_grid(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_read_bad_magic() {
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &sample_grid()).unwrap();
        bytes[0] = b'X';

        assert!(matches!(
            read_grid(&mut Cursor::new(bytes)),
            Err(GridFormatError::BadMagic)
        ));
    }

    #[test]
    fn test_read_unsupported_element() {
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &sample_grid()).unwrap();
        bytes[8] = 7;

        assert!(matches!(
            read_grid(&mut Cursor::new(bytes)),
            Err(GridFormatError::UnsupportedElement(7))
        ));
    }

    #[test]
    fn test_read_truncated_payload() {
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &sample_grid()).unwrap();
        bytes.truncate(bytes.len() - 4);

        match read_grid(&mut Cursor::new(bytes)) {
            Err(GridFormatError::LengthMismatch { expected, found }) => {
                assert_eq!(expected, 24);
                assert_eq!(found, 23);
            }
            other => panic!("expected length mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_read_truncated_header() {
        let bytes = b"FLOWGR".to_vec();
        assert!(matches!(
            read_grid(&mut Cursor::new(bytes)),
            Err(GridFormatError::Io(_))
        ));
    }

    #[test]
    fn test_channel_file_name() {
        let bounds = UVec3::new(128, 64, 32);
        assert_eq!(ChannelKey::new(Axis::X, bounds, 0).file_name(), "p_x_128.perlin");
        assert_eq!(ChannelKey::new(Axis::Y, bounds, 2).file_name(), "p_y_64_2.perlin");
        assert_eq!(ChannelKey::new(Axis::Z, bounds, 1).file_name(), "p_z_32_1.perlin");
    }

    #[test]
    fn test_read_huge_dims_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&GRID_MAGIC);
        bytes.push(ELEMENT_F32);
        bytes.extend_from_slice(&[0; 3]);
        for _ in 0..3 {
            bytes.extend_from_slice(&0x0020_0000u32.to_le_bytes());
        }

        match read_grid(&mut Cursor::new(bytes)) {
            Err(GridFormatError::DimsOverflow { dims }) => assert_eq!(dims, [0x0020_0000; 3]),
            other => panic!("expected dims overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_read_large_dims_short_payload() {
        let mut bytes = Vec::new();
        write_grid(&mut bytes, &NoiseGrid::filled(UVec3::new(1, 1, 2), 0.5)).unwrap();
        // Claim a billion cells but keep the two-value payload.
        bytes[12..16].copy_from_slice(&1000u32.to_le_bytes());
        bytes[16..20].copy_from_slice(&1000u32.to_le_bytes());
        bytes[20..24].copy_from_slice(&1000u32.to_le_bytes());

        assert!(matches!(
            read_grid(&mut Cursor::new(bytes)),
            Err(GridFormatError::LengthMismatch { expected: 1_000_000_000, found: 2 })
        ));
    }

    #[test]
    fn test_path_for_joins_dir() {
        let store = NoiseStore::new("/tmp/noise");
        let key = ChannelKey::new(Axis::X, UVec3::splat(16), 3);
        assert_eq!(store.path_for(&key), PathBuf::from("/tmp/noise/p_x_16_3.perlin"));
    }
}
