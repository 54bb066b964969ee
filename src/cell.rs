//! Cell Index Arithmetic
//!
//! A cell is nothing but an integer. Its level, parents and children are all
//! recovered from that integer without any stored graph.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest subdivision level accepted by configuration and containers
pub const MAX_LEVEL: u32 = 16;

/// Direction label used for parent/child and neighbor navigation
///
/// Every non-polar cell owns three edges of the grid, one per direction.
/// A cell introduced at level `L` sits halfway along the edge its first
/// parent owns in that cell's direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildType {
    /// Southward edge
    Down = 0,
    /// Eastward edge
    Straight = 1,
    /// Northward edge
    Up = 2,
}

impl ChildType {
    /// All directions in index order
    pub const ALL: [ChildType; 3] = [ChildType::Down, ChildType::Straight, ChildType::Up];

    /// Mirror the direction across the equator
    ///
    /// `Up` and `Down` swap, `Straight` is its own mirror.
    #[inline]
    pub fn flip(self) -> ChildType {
        match self {
            ChildType::Down => ChildType::Up,
            ChildType::Straight => ChildType::Straight,
            ChildType::Up => ChildType::Down,
        }
    }

    /// Numeric value used by the index arithmetic (0, 1 or 2)
    #[inline]
    pub fn index(self) -> u64 {
        self as u64
    }

    #[inline]
    pub(crate) fn from_index(value: u64) -> ChildType {
        match value {
            0 => ChildType::Down,
            1 => ChildType::Straight,
            _ => ChildType::Up,
        }
    }
}

/// A single cell of the geodesic grid
///
/// Cells `0` and `1` are the north and south poles. Cells `2..12` are the ten
/// remaining vertices of the icosahedron. Every further subdivision level `L`
/// appends the contiguous range `count_at_level(L - 1)..count_at_level(L)`,
/// one new cell per edge of the previous level.
///
/// # Design Notes
///
/// The index is a minimal perfect hash at any fixed level: the cells of level
/// `L` and coarser are exactly `0..count_at_level(L)`. Dense containers
/// ([`CellMap`](crate::CellMap), [`CellSet`](crate::CellSet)) rely on this.
///
/// Indices are 64-bit; `10 * 4^L` overflows 32 bits beyond level 14.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(u64);

impl Cell {
    /// The north pole (+Y)
    pub const NORTH: Cell = Cell(0);
    /// The south pole (-Y)
    pub const SOUTH: Cell = Cell(1);

    /// Wrap a raw index
    #[inline]
    pub const fn new(index: u64) -> Self {
        Cell(index)
    }

    /// Raw index of this cell
    #[inline]
    pub const fn index(self) -> u64 {
        self.0
    }

    /// Number of cells at `level` and all coarser levels: `10 * 4^level + 2`
    ///
    /// ```
    /// use geodesic_grid::Cell;
    ///
    /// assert_eq!(Cell::count_at_level(0), 12);
    /// assert_eq!(Cell::count_at_level(1), 42);
    /// assert_eq!(Cell::count_at_level(2), 162);
    /// ```
    #[inline]
    pub fn count_at_level(level: u32) -> u64 {
        assert!(level <= 30, "level {} overflows 64-bit cell indices", level);
        (10u64 << (2 * level)) + 2
    }

    /// All cells of `level` (and coarser) in ascending index order
    pub fn at_level(level: u32) -> CellsAtLevel {
        CellsAtLevel {
            next: 0,
            end: Cell::count_at_level(level),
        }
    }

    /// Subdivision level at which this cell first appears
    #[inline]
    pub fn level(self) -> u32 {
        if self.0 < 12 {
            return 0;
        }
        (((self.0 - 2) / 5).ilog2() + 1) / 2
    }

    /// True for the twelve cells with five neighbors
    #[inline]
    pub fn is_pentagon(self) -> bool {
        self.0 < 12
    }

    /// True for the two poles
    #[inline]
    pub fn is_polar(self) -> bool {
        self.0 < 2
    }

    #[inline]
    pub fn is_north(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_south(self) -> bool {
        self.0 == 1
    }

    /// The cell that owns the edge this cell was created on
    ///
    /// # Panics
    ///
    /// Panics for level-0 cells, which have no parents.
    #[inline]
    pub fn first_parent(self) -> Cell {
        Cell(self.subindex() / 3 + 2)
    }

    /// Which of its first parent's edges this cell was created on
    ///
    /// # Panics
    ///
    /// Panics for level-0 cells.
    #[inline]
    pub fn direction(self) -> ChildType {
        ChildType::from_index(self.subindex() % 3)
    }

    /// Offset of this cell inside the range its level appended
    fn subindex(self) -> u64 {
        let level = self.level();
        assert!(level > 0, "{} is a level-0 cell and has no parent", self);
        self.0 - Cell::count_at_level(level - 1)
    }

    /// The cell at `level` halfway along this cell's `direction` edge of
    /// `level - 1`
    ///
    /// At `level` this child is also the neighbor of `self` in `direction`.
    ///
    /// # Panics
    ///
    /// Panics for polar cells and when `level` is not finer than the cell.
    #[inline]
    pub fn child(self, direction: ChildType, level: u32) -> Cell {
        assert!(!self.is_polar(), "polar {} has no children", self);
        assert!(
            level > self.level(),
            "child of {} requested at level {} (cell level {})",
            self,
            level,
            self.level()
        );
        Cell(Cell::count_at_level(level - 1) + 3 * (self.0 - 2) + direction.index())
    }

    /// Take the child in `direction` repeatedly, `steps` times, starting from
    /// `from_level`
    ///
    /// Each step halves the distance to the neighbor this cell has in
    /// `direction` at `from_level`, so the result is the neighbor of that
    /// far cell at `from_level + steps` on the side facing `self`.
    ///
    /// With `a = index - 2` the iteration is
    /// `a' = 3a + 10·4^level + d` for `level = from_level, from_level + 1, ...`,
    /// which sums to `3^k·a + 10·4^from_level·(4^k - 3^k) + d·(3^k - 1)/2`.
    ///
    /// # Panics
    ///
    /// Panics for polar cells and when `from_level` is coarser than the cell.
    pub fn approach(self, direction: ChildType, from_level: u32, steps: u32) -> Cell {
        assert!(!self.is_polar(), "polar {} has no children", self);
        assert!(
            from_level >= self.level(),
            "{} does not exist at level {}",
            self,
            from_level
        );
        if steps == 0 {
            return self;
        }
        let pow3 = 3u64.pow(steps);
        let pow4 = 1u64 << (2 * steps);
        let base = 10u64 << (2 * from_level);
        let a = pow3 * (self.0 - 2) + base * (pow4 - pow3) + direction.index() * (pow3 - 1) / 2;
        Cell(a + 2)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

impl From<Cell> for u64 {
    fn from(cell: Cell) -> u64 {
        cell.0
    }
}

/// Iterator over every cell up to a level, in ascending index order
///
/// Cheap to clone; a clone restarts from the clone point.
#[derive(Debug, Clone)]
pub struct CellsAtLevel {
    next: u64,
    end: u64,
}

impl Iterator for CellsAtLevel {
    type Item = Cell;

    #[inline]
    fn next(&mut self) -> Option<Cell> {
        if self.next >= self.end {
            return None;
        }
        let cell = Cell(self.next);
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellsAtLevel {}
