//! Grid topology: positions, neighbors and point location
//!
//! [`Grid`] owns the lazily built position and neighbor caches. Two grids
//! never share state, so independently configured grids can coexist.

mod lattice;
mod neighbors;
mod positions;

use std::cell::RefCell;

use glam::Vec3;
use smallvec::SmallVec;
use tracing::debug;

use crate::cell::{Cell, CellsAtLevel, ChildType};
use crate::collections::{CellMap, CellSet};
use crate::config::GridConfig;

use neighbors::NeighborCache;
use positions::PositionCache;

/// Same-level neighbors of a cell, counter-clockwise seen from outside the
/// sphere. Never more than six, so never heap allocated.
pub type Neighbors = SmallVec<[Cell; 6]>;

/// A geodesic grid instance
///
/// Cell arithmetic is pure, but positions and same-level neighbor links are
/// expensive to derive and are cached here on first use. Queries take `&self`
/// and may grow the caches; the caches never shrink except through
/// [`Grid::clear_cache`].
///
/// A `Grid` is not `Sync`. Share it across threads only behind a lock.
///
/// # Examples
///
/// ```
/// use geodesic_grid::*;
///
/// let grid = Grid::new(GridConfig::default());
/// let cell = Cell::new(50);
///
/// let neighbors = grid.neighbors(cell, 2);
/// assert_eq!(neighbors.len(), 6);
///
/// let position = grid.position(cell);
/// assert!((position.length() - 1.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    positions: RefCell<PositionCache>,
    neighbors: RefCell<NeighborCache>,
}

impl Grid {
    /// Create a grid, prewarming its caches when the config asks for it
    pub fn new(config: GridConfig) -> Self {
        debug!(level = config.level(), prewarm = config.prewarm(), "creating grid");
        let grid = Self {
            config,
            positions: RefCell::new(PositionCache::new()),
            neighbors: RefCell::new(NeighborCache::new()),
        };
        if config.prewarm() {
            grid.prewarm(config.level());
        }
        grid
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Default resolution of this grid
    #[inline]
    pub fn level(&self) -> u32 {
        self.config.level()
    }

    /// Number of cells at the grid's default level
    #[inline]
    pub fn cell_count(&self) -> u64 {
        Cell::count_at_level(self.level())
    }

    /// All cells at the grid's default level
    pub fn cells(&self) -> CellsAtLevel {
        Cell::at_level(self.level())
    }

    /// An all-default map over the grid's default level
    pub fn cell_map<T: Default + Clone>(&self) -> CellMap<T> {
        CellMap::new(self.level())
    }

    /// An empty set over the grid's default level
    pub fn cell_set(&self) -> CellSet {
        CellSet::new(self.level())
    }

    /// Build position and neighbor caches up to `level` ahead of time
    pub fn prewarm(&self, level: u32) {
        let mut neighbors = self.neighbors.borrow_mut();
        neighbors.prewarm(level);
        self.positions.borrow_mut().ensure(level, &mut neighbors);
    }

    /// Drop every cached position and neighbor link
    pub fn clear_cache(&mut self) {
        debug!("clearing grid caches");
        self.positions.get_mut().clear();
        self.neighbors.get_mut().clear();
    }

    /// Highest level whose positions are cached, if any
    pub fn cached_level(&self) -> Option<u32> {
        self.positions.borrow().level()
    }

    /// Unit-sphere position of a cell center
    pub fn position(&self, cell: Cell) -> Vec3 {
        let mut neighbors = self.neighbors.borrow_mut();
        self.positions.borrow_mut().get(cell, &mut neighbors)
    }

    /// The neighbor of the first parent that, together with it, bounds the
    /// edge this cell was created on
    ///
    /// # Panics
    ///
    /// Panics for level-0 cells.
    pub fn second_parent(&self, cell: Cell) -> Cell {
        let first = cell.first_parent();
        let mut neighbors = self.neighbors.borrow_mut();
        forward_neighbor(&mut neighbors, first, cell.direction(), cell.level() - 1)
    }

    /// Same-level neighbors of `cell` at `level`
    ///
    /// Six cells for hexagons, five for the twelve pentagons and the poles.
    ///
    /// # Panics
    ///
    /// Panics when `level` is coarser than the cell's own level.
    pub fn neighbors(&self, cell: Cell, level: u32) -> Neighbors {
        neighbors_at(&mut self.neighbors.borrow_mut(), cell, level)
    }

    /// Cell whose center is nearest to `direction` at `level`
    ///
    /// Greedy refinement: starting from the nearer pole, move to whichever
    /// neighbor is closer to the target until none is, then descend a level.
    pub fn containing(&self, direction: Vec3, level: u32) -> Cell {
        let target = direction.normalize_or_zero();
        let mut current = if target.y >= 0.0 {
            Cell::NORTH
        } else {
            Cell::SOUTH
        };

        for l in 0..=level {
            loop {
                let mut best = current;
                let mut best_dot = self.position(current).dot(target);
                for neighbor in self.neighbors(current, l) {
                    let dot = self.position(neighbor).dot(target);
                    if dot > best_dot {
                        best = neighbor;
                        best_dot = dot;
                    }
                }
                if best == current {
                    break;
                }
                current = best;
            }
        }

        current
    }

    /// Cells within `hops` same-level steps of `center` (breadth first)
    ///
    /// Hop 0 is the center alone. The center comes first, followed by each
    /// ring in discovery order.
    pub fn cells_within_hops(&self, center: Cell, hops: u32, level: u32) -> Vec<Cell> {
        let mut visited = CellSet::new(level);
        visited.insert(center);
        let mut found = vec![center];
        let mut frontier = vec![center];

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell in &frontier {
                for neighbor in self.neighbors(cell, level) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            found.extend_from_slice(&next);
            frontier = next;
        }

        found
    }

    /// Great-circle angle between two cell centers, in radians
    pub fn angular_distance(&self, a: Cell, b: Cell) -> f32 {
        self.position(a).angle_between(self.position(b))
    }

    pub(crate) fn forward_neighbor(&self, cell: Cell, direction: ChildType, level: u32) -> Cell {
        forward_neighbor(&mut self.neighbors.borrow_mut(), cell, direction, level)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

/// Level-0 ring cell: `u_k` for the upper ring, `l_k` for the lower
#[inline]
fn ring(k: u64, upper: bool) -> Cell {
    Cell::new(2 + 2 * (k % 5) + u64::from(!upper))
}

/// Neighbor along an edge the cell owns
pub(crate) fn forward_neighbor(
    cache: &mut NeighborCache,
    cell: Cell,
    direction: ChildType,
    level: u32,
) -> Cell {
    assert!(!cell.is_polar(), "{} owns no edges", cell);
    let own = cell.level();
    assert!(
        level >= own,
        "neighbor of {} requested at level {} (cell level {})",
        cell,
        level,
        own
    );
    if level > own {
        return cell.child(direction, level);
    }
    if cell.is_pentagon() {
        let k = (cell.index() - 2) / 2;
        let upper = cell.index() % 2 == 0;
        return match (upper, direction) {
            (true, ChildType::Up) => Cell::NORTH,
            (true, ChildType::Straight) => ring(k + 1, true),
            (true, ChildType::Down) => ring(k, false),
            (false, ChildType::Up) => ring(k + 1, true),
            (false, ChildType::Straight) => ring(k + 1, false),
            (false, ChildType::Down) => Cell::SOUTH,
        };
    }
    cache.forward(cell, direction)
}

fn neighbors_at(cache: &mut NeighborCache, cell: Cell, level: u32) -> Neighbors {
    let own = cell.level();
    assert!(
        level >= own,
        "neighbors of {} requested at level {} (cell level {})",
        cell,
        level,
        own
    );

    if cell.is_polar() {
        return if cell.is_north() {
            (0..5)
                .rev()
                .map(|k| ring(k, true).approach(ChildType::Up, 0, level))
                .collect()
        } else {
            (0..5)
                .map(|k| ring(k, false).approach(ChildType::Down, 0, level))
                .collect()
        };
    }

    let mut out = Neighbors::new();
    if cell.is_pentagon() {
        // The missing sixth wedge of a pentagon sits between its two back edges
        let k = (cell.index() - 2) / 2;
        let (behind_up, behind_down) = if cell.index() % 2 == 0 {
            (
                ring(k + 4, false).approach(ChildType::Up, 0, level),
                ring(k + 4, true).approach(ChildType::Straight, 0, level),
            )
        } else {
            (
                ring(k + 4, false).approach(ChildType::Straight, 0, level),
                ring(k, true).approach(ChildType::Down, 0, level),
            )
        };
        out.push(behind_up);
        out.push(behind_down);
    } else {
        for direction in [ChildType::Up, ChildType::Straight, ChildType::Down] {
            let link = cache.back(cell, direction);
            out.push(link.owner.approach(link.direction, own, level - own));
        }
    }
    for direction in [ChildType::Up, ChildType::Straight, ChildType::Down] {
        out.push(forward_neighbor(cache, cell, direction, level));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_neighbor_counts() {
        let grid = Grid::default();
        for level in 0..4 {
            for cell in Cell::at_level(level) {
                let expected = if cell.is_pentagon() { 5 } else { 6 };
                assert_eq!(grid.neighbors(cell, level).len(), expected, "{} at level {}", cell, level);
            }
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let grid = Grid::default();
        for level in 0..5 {
            for cell in Cell::at_level(level) {
                for neighbor in grid.neighbors(cell, level) {
                    assert!(
                        grid.neighbors(neighbor, level).contains(&cell),
                        "{} -> {} not symmetric at level {}",
                        cell,
                        neighbor,
                        level
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbors_are_distinct() {
        let grid = Grid::default();
        for cell in Cell::at_level(3) {
            let mut neighbors = grid.neighbors(cell, 3);
            neighbors.sort();
            neighbors.dedup();
            assert!(!neighbors.contains(&cell));
            assert_eq!(neighbors.len(), if cell.is_pentagon() { 5 } else { 6 });
        }
    }

    #[test]
    fn test_neighbors_counter_clockwise() {
        let grid = Grid::default();
        let level = 3;
        for cell in Cell::at_level(level) {
            let center = grid.position(cell);
            let neighbors = grid.neighbors(cell, level);
            for (i, &a) in neighbors.iter().enumerate() {
                let b = neighbors[(i + 1) % neighbors.len()];
                // Consecutive neighbors are adjacent to each other
                assert!(grid.neighbors(a, level).contains(&b));
                let turn = (grid.position(a) - center).cross(grid.position(b) - center);
                assert!(turn.dot(center) > 0.0, "{} fan turns clockwise", cell);
            }
        }
    }

    #[test]
    fn test_coarse_cell_at_finer_level() {
        let grid = Grid::default();
        // A level-1 cell queried at level 3 is surrounded by level-3 cells
        let cell = Cell::new(20);
        for neighbor in grid.neighbors(cell, 3) {
            assert_eq!(neighbor.level(), 3);
        }
        // Its forward neighbors at a finer level are its own children
        assert!(grid.neighbors(cell, 3).contains(&cell.child(ChildType::Up, 3)));
    }

    #[test]
    fn test_positions_unit_length() {
        let grid = Grid::default();
        for cell in Cell::at_level(5) {
            assert_abs_diff_eq!(grid.position(cell).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_neighbors_are_nearby() {
        let grid = Grid::default();
        let level = 4;
        let mut shortest = f32::MAX;
        let mut longest = 0.0f32;
        for cell in Cell::at_level(level) {
            for neighbor in grid.neighbors(cell, level) {
                let angle = grid.angular_distance(cell, neighbor);
                shortest = shortest.min(angle);
                longest = longest.max(angle);
            }
        }
        assert!(longest / shortest < 1.25, "edge ratio {}", longest / shortest);
    }

    #[test]
    fn test_second_parent() {
        let grid = Grid::default();
        for index in 12..Cell::count_at_level(3) {
            let cell = Cell::new(index);
            let level = cell.level();
            let first = cell.first_parent();
            let second = grid.second_parent(cell);
            assert_ne!(first, second);
            assert!(grid.neighbors(first, level - 1).contains(&second));
            assert!(grid.neighbors(cell, level).contains(&first));
            assert!(grid.neighbors(cell, level).contains(&second));
        }
    }

    #[test]
    fn test_pole_neighbors() {
        let grid = Grid::default();
        assert_eq!(
            grid.neighbors(Cell::NORTH, 0).to_vec(),
            vec![Cell::new(10), Cell::new(8), Cell::new(6), Cell::new(4), Cell::new(2)]
        );
        assert_eq!(
            grid.neighbors(Cell::SOUTH, 0).to_vec(),
            vec![Cell::new(3), Cell::new(5), Cell::new(7), Cell::new(9), Cell::new(11)]
        );
        for level in 1..4 {
            for neighbor in grid.neighbors(Cell::NORTH, level) {
                assert!(grid.position(neighbor).y > 0.0);
            }
        }
    }

    #[test]
    fn test_containing_finds_own_cell() {
        let grid = Grid::default();
        for level in 0..4 {
            for cell in Cell::at_level(level) {
                assert_eq!(grid.containing(grid.position(cell), level), cell);
            }
        }
    }

    #[test]
    fn test_containing_is_nearest() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let grid = Grid::default();
        let level = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalize();
            let found = grid.containing(direction, level);
            let best = Cell::at_level(level)
                .map(|cell| grid.position(cell).dot(direction))
                .fold(f32::MIN, f32::max);
            assert_abs_diff_eq!(grid.position(found).dot(direction), best, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cells_within_hops() {
        let grid = Grid::default();
        let center = Cell::new(100);
        assert_eq!(grid.cells_within_hops(center, 0, 3), vec![center]);

        let ring1 = grid.cells_within_hops(center, 1, 3);
        assert_eq!(ring1.len(), 7);
        assert_eq!(ring1[0], center);

        let ring2 = grid.cells_within_hops(center, 2, 3);
        assert_eq!(ring2.len(), 19);
    }

    #[test]
    fn test_clear_cache() {
        let mut grid = Grid::default();
        let before = grid.position(Cell::new(500));
        assert_eq!(grid.cached_level(), Some(3));
        grid.clear_cache();
        assert_eq!(grid.cached_level(), None);
        assert_eq!(grid.position(Cell::new(500)), before);
    }

    #[test]
    fn test_prewarm() {
        let config = crate::GridConfigBuilder::new()
            .level(3)
            .unwrap()
            .prewarm(true)
            .build()
            .unwrap();
        let grid = Grid::new(config);
        assert_eq!(grid.cached_level(), Some(3));
        assert_eq!(grid.cell_count(), 642);
    }

    #[test]
    fn test_deepest_config() {
        let config = crate::GridConfigBuilder::new()
            .level(crate::MAX_LEVEL)
            .unwrap()
            .build()
            .unwrap();
        let grid = Grid::new(config);
        assert_eq!(grid.level(), crate::MAX_LEVEL);
        assert_eq!(grid.cell_count(), 10 * 4u64.pow(crate::MAX_LEVEL) + 2);
        assert_eq!(grid.cached_level(), None);
    }

    #[test]
    #[should_panic]
    fn test_neighbors_at_coarser_level_panics() {
        let grid = Grid::default();
        grid.neighbors(Cell::new(50), 1);
    }
}
