//! Per-frame occupancy grids.
//!
//! An [`OccupancyGrid`] marks which cells held at least one agent during a
//! frame. It is the only thing a renderer needs from the simulation.

use crate::grid::{cell_count, flat_index};
use glam::UVec3;
use log::debug;
use std::fmt::Write as _;

/// Indicator grid of occupied cells for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    dims: UVec3,
    cells: Vec<bool>,
    count: usize,
}

impl OccupancyGrid {
    /// Empty grid of `dims` cells.
    pub fn new(dims: UVec3) -> Self {
        Self {
            dims,
            cells: vec![false; cell_count(dims)],
            count: 0,
        }
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Mark `cell` as occupied.
    ///
    /// Returns `false` if the cell lies outside the grid, in which case
    /// nothing is marked.
    pub fn mark(&mut self, cell: UVec3) -> bool {
        if !cell.cmplt(self.dims).all() {
            debug!("Ignoring occupancy outside the volume at {}", cell);
            return false;
        }
        let idx = flat_index(self.dims, cell);
        if !self.cells[idx] {
            self.cells[idx] = true;
            self.count += 1;
        }
        true
    }

    /// Whether `cell` is occupied. Cells outside the grid never are.
    pub fn is_occupied(&self, cell: UVec3) -> bool {
        cell.cmplt(self.dims).all() && self.cells[flat_index(self.dims, cell)]
    }

    /// Number of distinct occupied cells.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Occupied cells in row-major order (X, then Y, then Z).
    pub fn occupied(&self) -> Vec<UVec3> {
        let (dy, dz) = (self.dims.y as usize, self.dims.z as usize);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| {
                let z = i % dz;
                let y = (i / dz) % dy;
                let x = i / (dy * dz);
                UVec3::new(x as u32, y as u32, z as u32)
            })
            .collect()
    }

    /// One `x y z` line per occupied cell.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for cell in self.occupied() {
            let _ = writeln!(out, "{} {} {}", cell.x, cell.y, cell.z);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_query() {
        let mut grid = OccupancyGrid::new(UVec3::splat(4));
        assert!(grid.is_empty());

        assert!(grid.mark(UVec3::new(1, 2, 3)));
        assert!(grid.is_occupied(UVec3::new(1, 2, 3)));
        assert!(!grid.is_occupied(UVec3::new(3, 2, 1)));
        assert_eq!(grid.count(), 1);
    }

    #[test]
    fn test_shared_cell_counted_once() {
        let mut grid = OccupancyGrid::new(UVec3::splat(4));
        grid.mark(UVec3::new(0, 0, 0));
        grid.mark(UVec3::new(0, 0, 0));
        assert_eq!(grid.count(), 1);
    }

    #[test]
    fn test_mark_outside_ignored() {
        let mut grid = OccupancyGrid::new(UVec3::new(2, 3, 4));
        assert!(!grid.mark(UVec3::new(2, 0, 0)));
        assert!(!grid.is_occupied(UVec3::new(2, 0, 0)));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_occupied_order() {
        let mut grid = OccupancyGrid::new(UVec3::new(3, 4, 5));
        grid.mark(UVec3::new(2, 0, 0));
        grid.mark(UVec3::new(0, 3, 1));
        grid.mark(UVec3::new(0, 0, 4));

        assert_eq!(
            grid.occupied(),
            vec![UVec3::new(0, 0, 4), UVec3::new(0, 3, 1), UVec3::new(2, 0, 0)]
        );
    }

    #[test]
    fn test_to_text() {
        let mut grid = OccupancyGrid::new(UVec3::splat(8));
        grid.mark(UVec3::new(1, 2, 3));
        grid.mark(UVec3::new(7, 0, 5));
        assert_eq!(grid.to_text(), "1 2 3\n7 0 5\n");
    }
}
