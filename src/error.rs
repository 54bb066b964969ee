//! Error types for grid configuration and container persistence

use thiserror::Error;

/// Recoverable errors raised by the grid.
///
/// Programmer errors (asking for a child of a pole, querying neighbors at a
/// level coarser than the cell, indexing a container out of range) are not
/// represented here; those panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A subdivision level beyond the supported maximum was requested
    #[error("level {level} is out of range (max {max})")]
    LevelOutOfRange {
        /// Requested level
        level: u32,
        /// Highest supported level
        max: u32,
    },

    /// A serialized cell set does not have the size its level implies
    #[error("cell set byte length mismatch: expected {expected}, got {actual}")]
    InvalidByteLength {
        /// Byte length implied by the level
        expected: usize,
        /// Byte length received
        actual: usize,
    },

    /// Padding bits past the last cell of a serialized cell set were set
    #[error("cell set has bits set past the last cell")]
    NonZeroPadding,

    /// A serialized cell map does not hold one value per cell of its level
    #[error("cell map value count mismatch: expected {expected}, got {actual}")]
    InvalidValueCount {
        /// Value count implied by the level
        expected: usize,
        /// Value count received
        actual: usize,
    },
}

/// Result type alias for grid operations
pub type Result<T> = std::result::Result<T, GridError>;
