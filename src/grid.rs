//! Dense 3D scalar grids.
//!
//! A [`NoiseGrid`] stores one `f32` per integer cell of an `X × Y × Z`
//! volume. Storage is row-major with X slowest and Z fastest, so the cell
//! `(x, y, z)` lives at `(x * Y + y) * Z + z`. This is the same layout the
//! on-disk format in [`crate::store`] uses for its payload.

use crate::error::GridFormatError;
use glam::UVec3;

/// One of the three spatial axes.
///
/// Each axis owns one noise channel of a velocity field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in channel order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Channel name used when persisting this axis' noise grid.
    pub fn channel_name(&self) -> &'static str {
        match self {
            Axis::X => "p_x",
            Axis::Y => "p_y",
            Axis::Z => "p_z",
        }
    }

    /// Lower-case axis letter.
    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    /// Pick this axis' component out of an integer vector.
    #[inline]
    pub fn of(&self, v: UVec3) -> u32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Number of cells in a volume of the given dimensions.
#[inline]
pub fn cell_count(dims: UVec3) -> usize {
    dims.x as usize * dims.y as usize * dims.z as usize
}

/// Number of cells, or `None` if it does not fit in `usize`.
#[inline]
pub fn checked_cell_count(dims: UVec3) -> Option<usize> {
    (dims.x as usize)
        .checked_mul(dims.y as usize)?
        .checked_mul(dims.z as usize)
}

/// Flat index of `cell` inside a volume of `dims`.
#[inline]
pub fn flat_index(dims: UVec3, cell: UVec3) -> usize {
    (cell.x as usize * dims.y as usize + cell.y as usize) * dims.z as usize + cell.z as usize
}

/// An immutable 3D array of noise values.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseGrid {
    dims: UVec3,
    values: Vec<f32>,
}

impl NoiseGrid {
    /// Wrap a flat row-major buffer.
    ///
    /// Fails if `values` does not hold exactly one value per cell.
    pub fn from_values(dims: UVec3, values: Vec<f32>) -> Result<Self, GridFormatError> {
        let expected = cell_count(dims);
        if values.len() != expected {
            return Err(GridFormatError::LengthMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { dims, values })
    }

    /// A grid holding the same value everywhere.
    pub fn filled(dims: UVec3, value: f32) -> Self {
        Self {
            dims,
            values: vec![value; cell_count(dims)],
        }
    }

    /// Build a grid by evaluating `f` at every cell, in storage order.
    pub fn from_fn(dims: UVec3, mut f: impl FnMut(UVec3) -> f32) -> Self {
        let mut values = Vec::with_capacity(cell_count(dims));
        for x in 0..dims.x {
            for y in 0..dims.y {
                for z in 0..dims.z {
                    values.push(f(UVec3::new(x, y, z)));
                }
            }
        }
        Self { dims, values }
    }

    /// Grid dimensions `(X, Y, Z)`.
    #[inline]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Whether `cell` lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: UVec3) -> bool {
        cell.cmplt(self.dims).all()
    }

    /// Value at `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[inline]
    pub fn get(&self, cell: UVec3) -> f32 {
        debug_assert!(self.contains(cell), "cell {} outside grid {}", cell, self.dims);
        self.values[flat_index(self.dims, cell)]
    }

    /// Value at `cell`, or `None` when outside the grid.
    pub fn try_get(&self, cell: UVec3) -> Option<f32> {
        if self.contains(cell) {
            Some(self.values[flat_index(self.dims, cell)])
        } else {
            None
        }
    }

    /// Flat row-major values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
