//! Raycasting against the height-displaced grid surface
//!
//! The surface at level `L` is the triangle mesh of [`triangles_at_level`]
//! with each corner cell pushed out to `position(cell) * height(cell)`.
//!
//! # Algorithm
//!
//! Traversal starts from the twenty level-0 triangles. At each level a
//! candidate survives only if the ray passes through both the ball of its
//! [`BoundsMap`] max radius and the cone its corners span from the sphere
//! center; every displaced triangle beneath it lies in that intersection.
//! Survivors split into their four children. At the target level the
//! remaining triangles get an exact ray/triangle test and the nearest hit
//! wins.

mod bounds;
mod triangle;

pub use bounds::BoundsMap;
pub use triangle::{triangles_at_level, Triangle, TrianglesAtLevel};

use glam::{Affine3A, Vec3};
use tracing::trace;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::height::HeightSampler;

/// Barycentric tolerance of the exact triangle test
const BARYCENTRIC_EPSILON: f32 = 1e-5;

/// Relative slack of the pruning tests
const PRUNE_SLACK: f32 = 1e-4;

/// A ray defined by an origin point and a direction vector.
///
/// The direction does not need to be normalized, but must be non-zero.
///
/// # Example
///
/// ```
/// use geodesic_grid::{Ray, Vec3};
///
/// let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
/// assert_eq!(ray.point_at(3.0), Vec3::new(6.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray from `origin` through `target`
    #[must_use]
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// `origin + t * direction`
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed through an affine map
    #[must_use]
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        Self {
            origin: transform.transform_point3(self.origin),
            direction: transform.transform_vector3(self.direction),
        }
    }
}

/// Nearest intersection of a ray with the grid surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Corner of the hit triangle nearest to the hit point
    pub cell: Cell,
    /// Distance from the ray origin, in the ray's space
    pub distance: f32,
    /// Hit point, in the ray's space
    pub point: Vec3,
}

impl Grid {
    /// Cell under the nearest surface hit, or `None` on a miss
    ///
    /// See [`Grid::raycast_hit`].
    pub fn raycast<H: HeightSampler + ?Sized>(
        &self,
        ray: &Ray,
        level: u32,
        bounds: &BoundsMap,
        height: &H,
        transform: Option<&Affine3A>,
    ) -> Option<Cell> {
        self.raycast_hit(ray, level, bounds, height, transform)
            .map(|hit| hit.cell)
    }

    /// Nearest intersection of `ray` with the surface at `level`
    ///
    /// `bounds` must have been built from the same `height` at `level` or
    /// finer. Heights are expected to be positive.
    ///
    /// With a `transform`, the ray is given in world space and `transform`
    /// maps grid-local space to world space; the hit is reported in world
    /// space.
    ///
    /// # Panics
    ///
    /// Panics if `level` is finer than `bounds`.
    ///
    /// # Example
    ///
    /// ```
    /// use geodesic_grid::*;
    ///
    /// let grid = Grid::default();
    /// let height = |_cell: Cell| 1.0f32;
    /// let bounds = BoundsMap::build(&grid, 3, &height);
    ///
    /// let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
    /// let hit = grid.raycast_hit(&ray, 3, &bounds, &height, None).unwrap();
    /// assert_eq!(hit.cell, Cell::NORTH);
    /// assert!((hit.distance - 4.0).abs() < 1e-4);
    /// ```
    pub fn raycast_hit<H: HeightSampler + ?Sized>(
        &self,
        ray: &Ray,
        level: u32,
        bounds: &BoundsMap,
        height: &H,
        transform: Option<&Affine3A>,
    ) -> Option<RaycastHit> {
        assert!(
            level <= bounds.level(),
            "raycast at level {} needs bounds to that level (have {})",
            level,
            bounds.level()
        );
        let local = match transform {
            Some(transform) => ray.transformed(&transform.inverse()),
            None => *ray,
        };

        let mut candidates: Vec<Triangle> = triangles_at_level(0).collect();
        for l in 0..=level {
            candidates.retain(|&triangle| {
                let corners = self
                    .triangle_vertices(triangle, l)
                    .map(|cell| self.position(cell));
                may_hit(&local, corners, bounds.max(triangle, l))
            });
            trace!(level = l, candidates = candidates.len(), "raycast level");
            if candidates.is_empty() {
                return None;
            }
            if l < level {
                candidates = candidates
                    .iter()
                    .flat_map(|triangle| triangle.children(l))
                    .collect();
            }
        }

        let mut nearest: Option<(f32, Cell)> = None;
        for triangle in candidates {
            let cells = self.triangle_vertices(triangle, level);
            let corners = cells.map(|cell| self.position(cell) * height.height(cell));
            let Some((t, weights)) = intersect_triangle(&local, corners) else {
                continue;
            };
            if nearest.is_some_and(|(best, _)| best <= t) {
                continue;
            }
            let corner = if weights.x >= weights.y && weights.x >= weights.z {
                0
            } else if weights.y >= weights.z {
                1
            } else {
                2
            };
            nearest = Some((t, cells[corner]));
        }

        nearest.map(|(t, cell)| RaycastHit {
            cell,
            distance: t * ray.direction.length(),
            point: ray.point_at(t),
        })
    }
}

/// Whether a ray can reach anything inside the ball of `radius` and the cone
/// spanned by `corners` (unit vectors, counter-clockwise)
fn may_hit(ray: &Ray, corners: [Vec3; 3], radius: f32) -> bool {
    let radius = radius * (1.0 + PRUNE_SLACK);
    let a = ray.direction.length_squared();
    let b = 2.0 * ray.origin.dot(ray.direction);
    let c = ray.origin.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a == 0.0 {
        return false;
    }
    let root = discriminant.sqrt();
    let mut enter = ((-b - root) / (2.0 * a)).max(0.0);
    let mut exit = (-b + root) / (2.0 * a);
    if exit < enter {
        return false;
    }

    // Clip the parameter interval by the three half-spaces bounding the cone
    let slack = PRUNE_SLACK * radius.max(ray.origin.length());
    for k in 0..3 {
        let normal = corners[k].cross(corners[(k + 1) % 3]).normalize_or_zero();
        let start = normal.dot(ray.origin) + slack;
        let rate = normal.dot(ray.direction);
        if rate == 0.0 {
            if start < 0.0 {
                return false;
            }
        } else if rate > 0.0 {
            enter = enter.max(-start / rate);
        } else {
            exit = exit.min(-start / rate);
        }
        if exit < enter {
            return false;
        }
    }
    true
}

/// Möller–Trumbore ray/triangle test, returning the ray parameter and the
/// barycentric weights of the three corners
fn intersect_triangle(ray: &Ray, [p0, p1, p2]: [Vec3; 3]) -> Option<(f32, Vec3)> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - p0;
    let u = tvec.dot(pvec) * inv_det;
    if !(-BARYCENTRIC_EPSILON..=1.0 + BARYCENTRIC_EPSILON).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some((t, Vec3::new(1.0 - u - v, u, v)))
}
