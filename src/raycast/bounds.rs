//! Per-triangle radial bounds
//!
//! The finest level takes the min and max height of each triangle's corners;
//! every coarser level takes the min and max over its four children. A ray
//! that misses the ball of a triangle's max bound misses everything beneath
//! that triangle.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::triangle::{triangles_at_level, Triangle};
use crate::cell::MAX_LEVEL;
use crate::collections::CellMap;
use crate::grid::Grid;
use crate::height::HeightSampler;

/// Radial min/max height per triangle for every level up to a target level
///
/// Must be rebuilt whenever the height function changes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsMap {
    level: u32,
    min: Vec<Vec<f32>>,
    max: Vec<Vec<f32>>,
}

impl BoundsMap {
    /// Build bounds for every level up to `level`
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`].
    pub fn build<H: HeightSampler + ?Sized>(grid: &Grid, level: u32, height: &H) -> Self {
        assert!(
            level <= MAX_LEVEL,
            "bounds level {} exceeds MAX_LEVEL ({})",
            level,
            MAX_LEVEL
        );
        debug!(
            level,
            triangles = Triangle::count_at_level(level),
            "building bounds map"
        );

        // Each cell is a corner of up to six triangles
        let heights = CellMap::from_fn(level, |cell| height.height(cell));

        let (finest_min, finest_max): (Vec<f32>, Vec<f32>) = triangles_at_level(level)
            .map(|triangle| {
                let corners = grid.triangle_vertices(triangle, level).map(|cell| heights[cell]);
                let low = corners[0].min(corners[1]).min(corners[2]);
                let high = corners[0].max(corners[1]).max(corners[2]);
                (low, high)
            })
            .unzip();

        let mut min = vec![finest_min];
        let mut max = vec![finest_max];
        for coarse in (0..level).rev() {
            let (fine_min, fine_max) = (&min[min.len() - 1], &max[max.len() - 1]);
            let (level_min, level_max): (Vec<f32>, Vec<f32>) = triangles_at_level(coarse)
                .map(|triangle| {
                    triangle
                        .children(coarse)
                        .iter()
                        .map(|child| child.index() as usize)
                        .fold((f32::INFINITY, f32::NEG_INFINITY), |(low, high), at| {
                            (low.min(fine_min[at]), high.max(fine_max[at]))
                        })
                })
                .unzip();
            min.push(level_min);
            max.push(level_max);
        }
        min.reverse();
        max.reverse();

        Self { level, min, max }
    }

    /// Finest level covered
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Lowest corner height under `triangle` at `level`
    ///
    /// # Panics
    ///
    /// Panics if `level` is finer than the map.
    #[inline]
    pub fn min(&self, triangle: Triangle, level: u32) -> f32 {
        self.min[level as usize][triangle.index() as usize]
    }

    /// Highest corner height under `triangle` at `level`
    #[inline]
    pub fn max(&self, triangle: Triangle, level: u32) -> f32 {
        self.max[level as usize][triangle.index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn bumpy(cell: Cell) -> f32 {
        1.0 + (cell.index() % 13) as f32 * 0.01
    }

    #[test]
    fn test_flat_bounds() {
        let grid = Grid::default();
        let bounds = BoundsMap::build(&grid, 2, &|_cell: Cell| 1.5f32);
        assert_eq!(bounds.level(), 2);
        for level in 0..=2 {
            for triangle in triangles_at_level(level) {
                assert_eq!(bounds.min(triangle, level), 1.5);
                assert_eq!(bounds.max(triangle, level), 1.5);
            }
        }
    }

    #[test]
    fn test_bounds_contain_children() {
        let grid = Grid::default();
        let bounds = BoundsMap::build(&grid, 3, &bumpy);
        for level in 0..3 {
            for triangle in triangles_at_level(level) {
                for child in triangle.children(level) {
                    assert!(bounds.min(triangle, level) <= bounds.min(child, level + 1));
                    assert!(bounds.max(triangle, level) >= bounds.max(child, level + 1));
                }
            }
        }
    }

    #[test]
    fn test_finest_bounds_match_corners() {
        let grid = Grid::default();
        let bounds = BoundsMap::build(&grid, 2, &bumpy);
        for triangle in triangles_at_level(2) {
            let heights = grid.triangle_vertices(triangle, 2).map(bumpy);
            let high = heights.iter().copied().fold(f32::MIN, f32::max);
            let low = heights.iter().copied().fold(f32::MAX, f32::min);
            assert_eq!(bounds.max(triangle, 2), high);
            assert_eq!(bounds.min(triangle, 2), low);
        }
    }

    #[test]
    fn test_root_bounds_cover_everything() {
        let grid = Grid::default();
        let bounds = BoundsMap::build(&grid, 3, &bumpy);
        let highest = Cell::at_level(3).map(bumpy).fold(f32::MIN, f32::max);
        let top = triangles_at_level(0)
            .map(|triangle| bounds.max(triangle, 0))
            .fold(f32::MIN, f32::max);
        assert_eq!(top, highest);
    }
}
