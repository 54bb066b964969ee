//! Grid Configuration and Builder
//!
//! This module provides configuration types for geodesic grid instances.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, MAX_LEVEL};
use crate::error::{GridError, Result};

/// Resolution presets
///
/// Each preset maps to a subdivision level and therefore to a fixed cell count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridResolution {
    /// Level 3: 642 cells
    Coarse,
    /// Level 5: 10,242 cells (default)
    Medium,
    /// Level 7: 163,842 cells
    Fine,
    /// Any other subdivision level
    Custom(u32),
}

impl GridResolution {
    /// Preset for a level, falling back to `Custom` when no preset matches
    pub fn from_level(level: u32) -> Self {
        match level {
            3 => GridResolution::Coarse,
            5 => GridResolution::Medium,
            7 => GridResolution::Fine,
            other => GridResolution::Custom(other),
        }
    }

    /// Subdivision level for this resolution
    pub fn level(self) -> u32 {
        match self {
            GridResolution::Coarse => 3,
            GridResolution::Medium => 5,
            GridResolution::Fine => 7,
            GridResolution::Custom(level) => level,
        }
    }

    /// Number of cells at this resolution
    pub fn cell_count(self) -> u64 {
        Cell::count_at_level(self.level())
    }

    /// Get a human-readable name for this resolution
    pub fn name(self) -> &'static str {
        match self {
            GridResolution::Coarse => "Coarse",
            GridResolution::Medium => "Medium",
            GridResolution::Fine => "Fine",
            GridResolution::Custom(_) => "Custom",
        }
    }
}

impl Default for GridResolution {
    fn default() -> Self {
        GridResolution::Medium
    }
}

/// Configuration for a [`Grid`](crate::Grid)
///
/// The topology itself is fixed; the configuration only picks the default
/// resolution used by the container helpers and whether caches are built up
/// front.
///
/// # Example
///
/// ```rust
/// use geodesic_grid::*;
///
/// let config = GridConfigBuilder::new()
///     .resolution(GridResolution::Fine)
///     .unwrap()
///     .prewarm(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.level(), 7);
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: GridConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGridConfig"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    resolution: GridResolution,
    prewarm: bool,
}

impl GridConfig {
    /// Default resolution of the grid
    #[inline]
    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    /// Build position and neighbor caches up to the default level on creation
    ///
    /// Without prewarming, caches fill in on first use of each level.
    #[inline]
    pub fn prewarm(&self) -> bool {
        self.prewarm
    }

    /// Default subdivision level
    #[inline]
    pub fn level(&self) -> u32 {
        self.resolution.level()
    }

    /// Cell count at the default level
    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.resolution.cell_count()
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: GridResolution::default(),
            prewarm: false,
        }
    }
}

/// Unvalidated wire form of [`GridConfig`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawGridConfig {
    resolution: GridResolution,
    prewarm: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGridConfig> for GridConfig {
    type Error = GridError;

    fn try_from(raw: RawGridConfig) -> Result<Self> {
        GridConfigBuilder::new()
            .resolution(raw.resolution)?
            .prewarm(raw.prewarm)
            .build()
    }
}

/// Builder for creating GridConfig with validation
///
/// # Example
///
/// ```rust
/// use geodesic_grid::*;
///
/// // Use defaults
/// let config = GridConfigBuilder::new().build().unwrap();
/// assert_eq!(config.level(), 5);
///
/// // Customize
/// let config = GridConfigBuilder::new()
///     .level(9)
///     .unwrap()
///     .prewarm(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.resolution(), GridResolution::Custom(9));
/// assert!(config.prewarm());
///
/// // Levels past MAX_LEVEL are rejected
/// assert!(GridConfigBuilder::new().level(MAX_LEVEL + 1).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GridConfigBuilder {
    resolution: GridResolution,
    prewarm: bool,
}

impl GridConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - resolution: Medium (level 5)
    /// - prewarm: false
    pub fn new() -> Self {
        Self {
            resolution: GridResolution::default(),
            prewarm: false,
        }
    }

    /// Set the resolution preset
    ///
    /// # Errors
    ///
    /// Returns `LevelOutOfRange` for a custom level above [`MAX_LEVEL`]
    pub fn resolution(mut self, resolution: GridResolution) -> Result<Self> {
        let level = resolution.level();
        if level > MAX_LEVEL {
            return Err(GridError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        self.resolution = resolution;
        Ok(self)
    }

    /// Set the resolution by subdivision level
    ///
    /// # Errors
    ///
    /// Returns `LevelOutOfRange` if `level` is above [`MAX_LEVEL`]
    pub fn level(self, level: u32) -> Result<Self> {
        self.resolution(GridResolution::from_level(level))
    }

    /// Enable or disable eager cache construction
    pub fn prewarm(mut self, prewarm: bool) -> Self {
        self.prewarm = prewarm;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if prewarming was requested for a level whose
    /// caches would not fit in memory on a 32-bit target
    pub fn build(self) -> Result<GridConfig> {
        let cells = self.resolution.cell_count();
        if self.prewarm && usize::try_from(cells).is_err() {
            return Err(GridError::InvalidConfig(format!(
                "cannot prewarm {} cells on this target",
                cells
            )));
        }
        Ok(GridConfig {
            resolution: self.resolution,
            prewarm: self.prewarm,
        })
    }
}

impl Default for GridConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
