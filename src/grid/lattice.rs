//! Ten-diamond lattice coordinates
//!
//! The twenty icosahedron faces pair up into ten diamonds. Each non-polar
//! level-0 cell is the origin corner of one diamond and owns every lattice
//! point `(i, j)` with `0 <= i, j < 2^level` inside it. Upper diamond `k` has
//! corners `u_k` (origin), the north pole (`+i`), `l_k` (`+j`) and `u_{k+1}`
//! (`+i+j`); lower diamond `k` has corners `l_k`, `u_{k+1}` (`+i`), the south
//! pole (`+j`) and `l_{k+1}`. Level-0 cell `2 + d` is the origin of diamond `d`;
//! even diamonds are upper, odd diamonds lower.
//!
//! Lattice steps are `Up = +i`, `Down = +j` and `Straight = +i+j`. Crossing a
//! diamond edge that touches a pole rotates the frame by sixty degrees; the
//! other edges are plain translations.

use crate::cell::{Cell, ChildType};

/// A non-polar cell expressed as a lattice point at a given level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LatticePoint {
    pub diamond: u8,
    pub i: i64,
    pub j: i64,
}

impl LatticePoint {
    #[inline]
    pub fn offset(self, (di, dj): (i64, i64)) -> LatticePoint {
        LatticePoint {
            diamond: self.diamond,
            i: self.i + di,
            j: self.j + dj,
        }
    }
}

/// Where a lattice point lands once it is moved back inside a diamond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Site {
    Pole(Cell),
    Point(LatticePoint),
}

/// Unit lattice step for a direction
#[inline]
pub(crate) fn step(direction: ChildType) -> (i64, i64) {
    match direction {
        ChildType::Down => (0, 1),
        ChildType::Straight => (1, 1),
        ChildType::Up => (1, 0),
    }
}

#[inline]
fn direction_of_step(delta: (i64, i64)) -> Option<ChildType> {
    match delta {
        (0, 1) => Some(ChildType::Down),
        (1, 1) => Some(ChildType::Straight),
        (1, 0) => Some(ChildType::Up),
        _ => None,
    }
}

/// Lattice point of a non-polar cell at `level` (which must not be coarser
/// than the cell's own level)
pub(crate) fn locate(cell: Cell, level: u32) -> LatticePoint {
    debug_assert!(!cell.is_polar());
    let own = cell.level();
    let point = if own == 0 {
        LatticePoint {
            diamond: (cell.index() - 2) as u8,
            i: 0,
            j: 0,
        }
    } else {
        let parent = locate(cell.first_parent(), own - 1);
        let (di, dj) = step(cell.direction());
        LatticePoint {
            diamond: parent.diamond,
            i: 2 * parent.i + di,
            j: 2 * parent.j + dj,
        }
    };
    let shift = level - own;
    LatticePoint {
        diamond: point.diamond,
        i: point.i << shift,
        j: point.j << shift,
    }
}

/// Cell at an in-range lattice point
pub(crate) fn cell_at(point: LatticePoint, level: u32) -> Cell {
    let mut shift = level;
    if point.i != 0 {
        shift = shift.min(point.i.trailing_zeros());
    }
    if point.j != 0 {
        shift = shift.min(point.j.trailing_zeros());
    }
    let own = level - shift;
    let (i, j) = (point.i >> shift, point.j >> shift);
    if own == 0 {
        return Cell::new(point.diamond as u64 + 2);
    }
    let direction = match (i & 1, j & 1) {
        (0, _) => ChildType::Down,
        (_, 0) => ChildType::Up,
        _ => ChildType::Straight,
    };
    let parent = cell_at(
        LatticePoint {
            diamond: point.diamond,
            i: i >> 1,
            j: j >> 1,
        },
        own - 1,
    );
    parent.child(direction, own)
}

/// Resolve a point at most one step outside its diamond
pub(crate) fn resolve(point: LatticePoint, level: u32) -> Site {
    resolve_with_anchor(point, (point.i, point.j), level).0
}

/// Resolve a point, carrying `anchor` through the same seam crossings
///
/// The anchor comes back expressed in the frame of the diamond the point
/// settled in, which recovers the direction between two neighbors when they
/// sit on opposite sides of a seam.
pub(crate) fn resolve_with_anchor(
    point: LatticePoint,
    anchor: (i64, i64),
    level: u32,
) -> (Site, (i64, i64)) {
    let n = 1i64 << level;
    let LatticePoint {
        mut diamond,
        mut i,
        mut j,
    } = point;
    let mut anchor = anchor;

    for _ in 0..4 {
        let upper = diamond % 2 == 0;
        if upper && (i, j) == (n, 0) {
            return (Site::Pole(Cell::NORTH), anchor);
        }
        if !upper && (i, j) == (0, n) {
            return (Site::Pole(Cell::SOUTH), anchor);
        }
        if (0..n).contains(&i) && (0..n).contains(&j) {
            return (Site::Point(LatticePoint { diamond, i, j }), anchor);
        }
        let seam = Seam::crossed(upper, i, j, n);
        (i, j) = seam.map(i, j, n);
        anchor = seam.map(anchor.0, anchor.1, n);
        diamond = seam.target(diamond);
    }
    unreachable!("lattice point {:?} is more than one step outside its diamond", point)
}

/// Direction from `from` to `to`, both in the same frame, if they are one
/// forward step apart
#[inline]
pub(crate) fn forward_direction(from: LatticePoint, to: (i64, i64)) -> Option<ChildType> {
    direction_of_step((to.0 - from.i, to.1 - from.j))
}

/// One of the eight diamond edges a point can cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seam {
    /// Upper diamond, north pole to `u_{k+1}`
    UpperPolarEast,
    /// Upper diamond, `u_k` to north pole
    UpperPolarWest,
    /// Upper diamond, `u_k` to `l_k`
    UpperWest,
    /// Upper diamond, `l_k` to `u_{k+1}`
    UpperSouth,
    /// Lower diamond, south pole to `l_{k+1}`
    LowerPolarEast,
    /// Lower diamond, `l_k` to south pole
    LowerPolarWest,
    /// Lower diamond, `l_k` to `u_{k+1}`
    LowerNorth,
    /// Lower diamond, `u_{k+1}` to `l_{k+1}`
    LowerEast,
}

impl Seam {
    fn crossed(upper: bool, i: i64, j: i64, n: i64) -> Seam {
        if upper {
            if i >= n {
                Seam::UpperPolarEast
            } else if j < 0 {
                Seam::UpperPolarWest
            } else if i < 0 {
                Seam::UpperWest
            } else {
                Seam::UpperSouth
            }
        } else if j >= n {
            Seam::LowerPolarEast
        } else if i < 0 {
            Seam::LowerPolarWest
        } else if j < 0 {
            Seam::LowerNorth
        } else {
            Seam::LowerEast
        }
    }

    fn target(self, diamond: u8) -> u8 {
        let k = diamond / 2;
        let east = (k + 1) % 5;
        let west = (k + 4) % 5;
        match self {
            Seam::UpperPolarEast => 2 * east,
            Seam::UpperPolarWest => 2 * west,
            Seam::UpperWest => 2 * west + 1,
            Seam::UpperSouth => 2 * k + 1,
            Seam::LowerPolarEast => 2 * east + 1,
            Seam::LowerPolarWest => 2 * west + 1,
            Seam::LowerNorth => 2 * k,
            Seam::LowerEast => 2 * east,
        }
    }

    fn map(self, i: i64, j: i64, n: i64) -> (i64, i64) {
        match self {
            Seam::UpperPolarEast => (i - j, i - n),
            Seam::UpperPolarWest => (n + j, n - i + j),
            Seam::UpperWest => (n + i, j),
            Seam::UpperSouth => (i, j - n),
            Seam::LowerPolarEast => (j - n, j - i),
            Seam::LowerPolarWest => (n + i - j, n + i),
            Seam::LowerNorth => (i, j + n),
            Seam::LowerEast => (i - n, j),
        }
    }
}
