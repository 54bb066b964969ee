//! Hierarchical icosahedral geodesic grid
//!
//! A standalone library for addressing the surface of a planet as a
//! multi-resolution grid of cells (twelve pentagons, the rest hexagons),
//! suitable for use with any game engine.
//!
//! Cells are plain integers. Level, parents, children and neighbors are all
//! recovered by arithmetic; positions and neighbor links are cached lazily
//! per [`Grid`] instance.
//!
//! # Quick Start
//!
//! ```rust
//! use geodesic_grid::*;
//!
//! let grid = Grid::new(
//!     GridConfigBuilder::new()
//!         .resolution(GridResolution::Coarse).unwrap()
//!         .build().unwrap(),
//! );
//! assert_eq!(grid.cell_count(), 642);
//!
//! // Neighbors and positions
//! let cell = grid.containing(Vec3::new(0.3, 0.8, -0.5), grid.level());
//! assert_eq!(grid.neighbors(cell, grid.level()).len(), 6);
//!
//! // Per-cell data
//! let mut elevation: CellMap<f32> = grid.cell_map();
//! for c in grid.cells() {
//!     elevation[c] = 1.0 + 0.01 * grid.position(c).y;
//! }
//!
//! // Raycasting against the displaced surface
//! let bounds = BoundsMap::build(&grid, grid.level(), &elevation);
//! let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
//! let hit = grid.raycast(&ray, grid.level(), &bounds, &elevation, None);
//! assert!(hit.is_some());
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for cells, configuration,
//!   containers and bounds maps

// Modules
pub mod cell;
pub mod collections;
pub mod config;
pub mod error;
pub mod grid;
pub mod height;
pub mod raycast;

// Re-export core types for convenience
pub use cell::{Cell, CellsAtLevel, ChildType, MAX_LEVEL};
pub use collections::{CellMap, CellSet};
pub use config::{GridConfig, GridConfigBuilder, GridResolution};
pub use error::{GridError, Result};
pub use grid::{Grid, Neighbors};
pub use height::{HeightSampler, UniformHeight};
pub use raycast::{triangles_at_level, BoundsMap, Ray, RaycastHit, Triangle, TrianglesAtLevel};

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
