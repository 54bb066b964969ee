//! Height sampling seam
//!
//! Raycasting and bounds construction need one radial height per cell. The
//! values come from outside the grid (terrain, elevation data, gameplay), so
//! they are taken through a trait rather than stored here.

use crate::cell::Cell;
use crate::collections::CellMap;

/// Radial height of a cell's surface vertex
///
/// A height of `1.0` places the vertex on the unit sphere.
///
/// # Example
///
/// ```rust
/// use geodesic_grid::*;
///
/// fn average<H: HeightSampler + ?Sized>(sampler: &H, cells: &[Cell]) -> f32 {
///     cells.iter().map(|&cell| sampler.height(cell)).sum::<f32>() / cells.len() as f32
/// }
///
/// // Closures are samplers
/// let flat = |_cell: Cell| 2.0f32;
/// assert_eq!(average(&flat, &[Cell::NORTH, Cell::SOUTH]), 2.0);
///
/// // So are precomputed maps
/// let map = CellMap::filled(1, 3.0f32);
/// assert_eq!(average(&map, &[Cell::new(20)]), 3.0);
/// ```
pub trait HeightSampler {
    fn height(&self, cell: Cell) -> f32;
}

impl<F> HeightSampler for F
where
    F: Fn(Cell) -> f32,
{
    #[inline]
    fn height(&self, cell: Cell) -> f32 {
        self(cell)
    }
}

impl HeightSampler for CellMap<f32> {
    /// # Panics
    ///
    /// Panics for cells finer than the map's level.
    #[inline]
    fn height(&self, cell: Cell) -> f32 {
        self[cell]
    }
}

/// Every cell at the same radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformHeight(pub f32);

impl HeightSampler for UniformHeight {
    #[inline]
    fn height(&self, _cell: Cell) -> f32 {
        self.0
    }
}

impl Default for UniformHeight {
    fn default() -> Self {
        UniformHeight(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_sampler() {
        let sampler = |cell: Cell| cell.index() as f32;
        assert_eq!(sampler.height(Cell::new(7)), 7.0);
    }

    #[test]
    fn test_map_sampler() {
        let mut map: CellMap<f32> = CellMap::new(1);
        map[Cell::new(30)] = 1.5;
        assert_eq!(map.height(Cell::new(30)), 1.5);
        assert_eq!(map.height(Cell::new(31)), 0.0);
    }

    #[test]
    fn test_uniform_sampler() {
        assert_eq!(UniformHeight::default().height(Cell::new(99)), 1.0);
        assert_eq!(UniformHeight(4.0).height(Cell::SOUTH), 4.0);
    }
}
