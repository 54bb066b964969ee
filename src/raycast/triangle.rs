//! Triangle hierarchy over the grid
//!
//! Every non-polar cell roots two triangles per level, one on each side of
//! its `Straight` edge. The twenty level-0 triangles are the icosahedron
//! faces; each triangle splits into four at the next level, and the children
//! stay inside the cone the parent spans from the sphere center.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, ChildType};
use crate::grid::Grid;

/// A triangle of the grid at some level, identified by its root cell and
/// the side of the root's `Straight` edge it lies on
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub root: Cell,
    /// `ChildType::Up` or `ChildType::Down`
    pub side: ChildType,
}

impl Triangle {
    /// # Panics
    ///
    /// Panics for a polar root or a `Straight` side.
    pub fn new(root: Cell, side: ChildType) -> Self {
        assert!(!root.is_polar(), "polar {} roots no triangles", root);
        assert!(side != ChildType::Straight, "triangle side must be Up or Down");
        Self { root, side }
    }

    /// Number of triangles at a level: `20 * 4^level`
    #[inline]
    pub fn count_at_level(level: u32) -> u64 {
        20u64 << (2 * level)
    }

    /// Dense index, `2 * (root - 2)` plus one for the `Down` side
    ///
    /// Triangles of level `L` and their roots' coarser ancestors share the
    /// range `0..count_at_level(L)`.
    #[inline]
    pub fn index(self) -> u64 {
        2 * (self.root.index() - 2) + u64::from(self.side == ChildType::Down)
    }

    #[inline]
    pub fn from_index(index: u64) -> Self {
        let side = if index % 2 == 0 {
            ChildType::Up
        } else {
            ChildType::Down
        };
        Self {
            root: Cell::new(index / 2 + 2),
            side,
        }
    }

    /// The four triangles at `level + 1` that tile this triangle at `level`
    ///
    /// The first child keeps the root, the last is the inverted center
    /// triangle.
    pub fn children(self, level: u32) -> [Triangle; 4] {
        let finer = level + 1;
        let along_side = self.root.child(self.side, finer);
        let along_straight = self.root.child(ChildType::Straight, finer);
        [
            self,
            Triangle {
                root: along_side,
                side: self.side,
            },
            Triangle {
                root: along_straight,
                side: self.side,
            },
            Triangle {
                root: along_side,
                side: self.side.flip(),
            },
        ]
    }
}

/// All triangles of a level in index order
pub fn triangles_at_level(level: u32) -> TrianglesAtLevel {
    TrianglesAtLevel {
        next: 0,
        end: Triangle::count_at_level(level),
    }
}

#[derive(Debug, Clone)]
pub struct TrianglesAtLevel {
    next: u64,
    end: u64,
}

impl Iterator for TrianglesAtLevel {
    type Item = Triangle;

    fn next(&mut self) -> Option<Triangle> {
        if self.next >= self.end {
            return None;
        }
        let triangle = Triangle::from_index(self.next);
        self.next += 1;
        Some(triangle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrianglesAtLevel {}

impl Grid {
    /// Corner cells of a triangle at `level`, counter-clockwise seen from
    /// outside the sphere, root first
    pub fn triangle_vertices(&self, triangle: Triangle, level: u32) -> [Cell; 3] {
        let root = triangle.root;
        match triangle.side {
            ChildType::Up => [
                root,
                self.forward_neighbor(root, ChildType::Up, level),
                self.forward_neighbor(root, ChildType::Straight, level),
            ],
            _ => [
                root,
                self.forward_neighbor(root, ChildType::Straight, level),
                self.forward_neighbor(root, ChildType::Down, level),
            ],
        }
    }
}
