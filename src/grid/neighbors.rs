//! Per-level memoization of same-level neighbor lookups
//!
//! Deriving a neighbor from scratch walks the whole parent chain. Only the
//! cells introduced at a level need that walk, and only once: at any finer
//! level their neighbors follow from the stored links in O(1).

use tracing::debug;

use super::lattice::{self, Site};
use crate::cell::{Cell, ChildType};

/// The far end of an edge a cell does not own
///
/// `owner` reaches the cell by stepping in `direction` (in the owner's own
/// frame, which differs from the cell's frame across a polar seam).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BackLink {
    pub owner: Cell,
    pub direction: ChildType,
}

/// Links for the cells introduced at one level, indexed by
/// `index - count_at_level(level - 1)` and then by `ChildType::index()`
#[derive(Debug, Clone)]
struct LevelTable {
    forward: Vec<[Cell; 3]>,
    back: Vec<[BackLink; 3]>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NeighborCache {
    levels: Vec<Option<LevelTable>>,
}

impl NeighborCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same-level neighbor of a cell introduced at its own level
    pub fn forward(&mut self, cell: Cell, direction: ChildType) -> Cell {
        let (table, slot) = self.table_for(cell);
        table.forward[slot][direction.index() as usize]
    }

    /// Owner of the edge reaching `cell` from behind in `direction`
    pub fn back(&mut self, cell: Cell, direction: ChildType) -> BackLink {
        let (table, slot) = self.table_for(cell);
        table.back[slot][direction.index() as usize]
    }

    /// Number of levels currently materialized
    pub fn cached_levels(&self) -> usize {
        self.levels.iter().filter(|table| table.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Materialize every level up to `level`
    pub fn prewarm(&mut self, level: u32) {
        for l in 1..=level {
            self.ensure(l);
        }
    }

    fn table_for(&mut self, cell: Cell) -> (&LevelTable, usize) {
        let level = cell.level();
        debug_assert!(level > 0, "level-0 cells are not memoized");
        let slot = (cell.index() - Cell::count_at_level(level - 1)) as usize;
        (self.ensure(level), slot)
    }

    fn ensure(&mut self, level: u32) -> &LevelTable {
        let at = level as usize;
        if self.levels.len() <= at {
            self.levels.resize_with(at + 1, || None);
        }
        self.levels[at].get_or_insert_with(|| build_level(level))
    }
}

fn build_level(level: u32) -> LevelTable {
    let start = Cell::count_at_level(level - 1);
    let end = Cell::count_at_level(level);
    let count = (end - start) as usize;
    debug!(level, count, "building neighbor table");

    let mut forward = Vec::with_capacity(count);
    let mut back = Vec::with_capacity(count);

    for index in start..end {
        let point = lattice::locate(Cell::new(index), level);

        let ahead = ChildType::ALL.map(|direction| {
            match lattice::resolve(point.offset(lattice::step(direction)), level) {
                Site::Pole(pole) => pole,
                Site::Point(p) => lattice::cell_at(p, level),
            }
        });

        let behind = ChildType::ALL.map(|direction| {
            let (di, dj) = lattice::step(direction);
            let (site, anchor) =
                lattice::resolve_with_anchor(point.offset((-di, -dj)), (point.i, point.j), level);
            let owner = match site {
                Site::Point(p) => p,
                Site::Pole(pole) => unreachable!("{} owns no edges", pole),
            };
            let owner_direction = lattice::forward_direction(owner, anchor)
                .unwrap_or_else(|| unreachable!("back edge of cell#{} is not owned by its neighbor", index));
            BackLink {
                owner: lattice::cell_at(owner, level),
                direction: owner_direction,
            }
        });

        forward.push(ahead);
        back.push(behind);
    }

    LevelTable { forward, back }
}
