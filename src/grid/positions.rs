//! Lazily grown unit-sphere positions
//!
//! Positions are stored in one flat vector indexed by cell. Growing the cache
//! to a level appends exactly the cells that level introduces, each the
//! normalized midpoint of its two parents.

use std::f32::consts::PI;

use glam::Vec3;
use tracing::debug;

use super::neighbors::NeighborCache;
use crate::cell::Cell;

/// Latitude of the two level-0 rings, `atan(1/2)`
const RING_LATITUDE: f32 = 0.463_647_6;

#[derive(Debug, Clone, Default)]
pub(crate) struct PositionCache {
    positions: Vec<Vec3>,
    level: Option<u32>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a cell, growing the cache to the cell's level first
    pub fn get(&mut self, cell: Cell, neighbors: &mut NeighborCache) -> Vec3 {
        self.ensure(cell.level(), neighbors);
        self.positions[cell.index() as usize]
    }

    /// Highest level fully cached
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.positions.shrink_to_fit();
        self.level = None;
    }

    pub fn ensure(&mut self, level: u32, neighbors: &mut NeighborCache) {
        if self.level.is_some_and(|cached| cached >= level) {
            return;
        }
        if self.level.is_none() {
            self.positions = (0..12).map(|index| base_position(Cell::new(index))).collect();
            self.level = Some(0);
        }
        while let Some(cached) = self.level.filter(|&cached| cached < level) {
            let next = cached + 1;
            let end = Cell::count_at_level(next);
            debug!(level = next, cells = end, "extending position cache");
            self.positions.reserve((end - self.positions.len() as u64) as usize);
            for index in Cell::count_at_level(cached)..end {
                let cell = Cell::new(index);
                let first = cell.first_parent();
                let second = super::forward_neighbor(neighbors, first, cell.direction(), cached);
                let midpoint = self.positions[first.index() as usize] + self.positions[second.index() as usize];
                self.positions.push(midpoint.normalize());
            }
            self.level = Some(next);
        }
    }
}

/// Closed-form position of a level-0 cell
///
/// Poles sit on ±Y. Ring cell `2 + 2k` lies at latitude `atan(1/2)` and
/// longitude `72k` degrees, ring cell `3 + 2k` at the mirrored latitude and
/// longitude `72k + 36` degrees.
pub(crate) fn base_position(cell: Cell) -> Vec3 {
    debug_assert!(cell.level() == 0);
    match cell.index() {
        0 => Vec3::Y,
        1 => Vec3::NEG_Y,
        index => {
            let diamond = index - 2;
            let k = (diamond / 2) as f32;
            let (latitude, longitude) = if diamond % 2 == 0 {
                (RING_LATITUDE, k * 2.0 * PI / 5.0)
            } else {
                (-RING_LATITUDE, (k + 0.5) * 2.0 * PI / 5.0)
            };
            Vec3::new(
                latitude.cos() * longitude.cos(),
                latitude.sin(),
                latitude.cos() * longitude.sin(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_base_positions_are_icosahedron() {
        // Every level-0 cell has exactly five others at the icosahedron edge
        // angle, atan(2)
        let edge = 2.0f32.atan();
        for a in 0..12 {
            let pa = base_position(Cell::new(a));
            assert_abs_diff_eq!(pa.length(), 1.0, epsilon = 1e-6);
            let adjacent = (0..12)
                .filter(|&b| b != a)
                .filter(|&b| (pa.angle_between(base_position(Cell::new(b))) - edge).abs() < 1e-4)
                .count();
            assert_eq!(adjacent, 5, "cell {} has {} icosahedron edges", a, adjacent);
        }
    }

    #[test]
    fn test_positions_grow_monotonically() {
        let mut neighbors = NeighborCache::new();
        let mut cache = PositionCache::new();
        assert_eq!(cache.level(), None);

        let p = cache.get(Cell::new(50), &mut neighbors);
        assert_eq!(cache.level(), Some(2));
        assert_abs_diff_eq!(p.length(), 1.0, epsilon = 1e-5);

        // Asking for a coarser cell does not shrink or rebuild anything
        cache.get(Cell::new(3), &mut neighbors);
        assert_eq!(cache.level(), Some(2));

        cache.ensure(4, &mut neighbors);
        assert_eq!(cache.level(), Some(4));
        assert_eq!(cache.positions.len() as u64, Cell::count_at_level(4));

        cache.clear();
        assert_eq!(cache.level(), None);
    }

    #[test]
    fn test_children_between_parents() {
        let mut neighbors = NeighborCache::new();
        let mut cache = PositionCache::new();
        for index in 12..Cell::count_at_level(3) {
            let cell = Cell::new(index);
            let level = cell.level();
            let first = cell.first_parent();
            let second = crate::grid::forward_neighbor(&mut neighbors, first, cell.direction(), level - 1);
            let p = cache.get(cell, &mut neighbors);
            let a = cache.get(first, &mut neighbors);
            let b = cache.get(second, &mut neighbors);
            assert_abs_diff_eq!(p.angle_between(a), p.angle_between(b), epsilon = 1e-4);
        }
    }
}
