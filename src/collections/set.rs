#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{capacity, slot};
use crate::cell::{Cell, MAX_LEVEL};
use crate::error::{GridError, Result};

/// Membership bitset over every cell up to a level
///
/// # Byte Format
///
/// [`to_bytes`](CellSet::to_bytes) packs cell `i` into bit `i % 8` of byte
/// `i / 8`, least significant bit first. The buffer is exactly
/// `ceil(count_at_level(level) / 8)` bytes and the unused high bits of the
/// last byte are zero.
///
/// # Example
///
/// ```rust
/// use geodesic_grid::*;
///
/// let mut visited = CellSet::new(3);
/// visited.insert(Cell::new(7));
/// visited.insert(Cell::new(300));
///
/// let bytes = visited.to_bytes();
/// let restored = CellSet::from_bytes(&bytes, 3).unwrap();
/// assert_eq!(restored, visited);
/// assert_eq!(restored.iter().collect::<Vec<_>>(), vec![Cell::new(7), Cell::new(300)]);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "PackedCellSet", into = "PackedCellSet")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSet {
    level: u32,
    cells: usize,
    members: usize,
    words: Vec<u64>,
}

impl CellSet {
    /// Empty set covering every cell up to `level`
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`].
    pub fn new(level: u32) -> Self {
        let cells = capacity(level);
        Self {
            level,
            cells,
            members: 0,
            words: vec![0; cells.div_ceil(64)],
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of cells the set can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells
    }

    /// Number of members
    #[inline]
    pub fn len(&self) -> usize {
        self.members
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members == 0
    }

    #[track_caller]
    pub fn contains(&self, cell: Cell) -> bool {
        let at = slot(cell, self.level, self.cells);
        self.words[at / 64] & (1 << (at % 64)) != 0
    }

    /// Add a cell, returning whether it was newly inserted
    #[track_caller]
    pub fn insert(&mut self, cell: Cell) -> bool {
        let at = slot(cell, self.level, self.cells);
        let word = &mut self.words[at / 64];
        let bit = 1 << (at % 64);
        if *word & bit != 0 {
            return false;
        }
        *word |= bit;
        self.members += 1;
        true
    }

    /// Remove a cell, returning whether it was a member
    #[track_caller]
    pub fn remove(&mut self, cell: Cell) -> bool {
        let at = slot(cell, self.level, self.cells);
        let word = &mut self.words[at / 64];
        let bit = 1 << (at % 64);
        if *word & bit == 0 {
            return false;
        }
        *word &= !bit;
        self.members -= 1;
        true
    }

    #[track_caller]
    pub fn set(&mut self, cell: Cell, member: bool) {
        if member {
            self.insert(cell);
        } else {
            self.remove(cell);
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.members = 0;
    }

    /// Members in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(w, &word)| SetBits(word).map(move |bit| Cell::new((w * 64 + bit) as u64)))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self.words.iter().flat_map(|word| word.to_le_bytes()).collect();
        bytes.truncate(self.cells.div_ceil(8));
        bytes
    }

    /// Rebuild a set written by [`to_bytes`](CellSet::to_bytes)
    ///
    /// # Errors
    ///
    /// - `LevelOutOfRange` if `level` exceeds [`MAX_LEVEL`]
    /// - `InvalidByteLength` if the buffer length does not match the level
    /// - `NonZeroPadding` if any bit past the last cell is set
    pub fn from_bytes(bytes: &[u8], level: u32) -> Result<Self> {
        if level > MAX_LEVEL {
            return Err(GridError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        let mut set = CellSet::new(level);
        let expected = set.cells.div_ceil(8);
        if bytes.len() != expected {
            return Err(GridError::InvalidByteLength {
                expected,
                actual: bytes.len(),
            });
        }
        let used = set.cells % 8;
        if let Some(&last) = bytes.last() {
            if used != 0 && last >> used != 0 {
                return Err(GridError::NonZeroPadding);
            }
        }

        for (word, chunk) in set.words.iter_mut().zip(bytes.chunks(8)) {
            let mut raw = [0u8; 8];
            raw[..chunk.len()].copy_from_slice(chunk);
            *word = u64::from_le_bytes(raw);
        }
        set.members = set.words.iter().map(|word| word.count_ones() as usize).sum();
        Ok(set)
    }
}

/// Wire form of [`CellSet`]: its level and the [`to_bytes`](CellSet::to_bytes) buffer
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct PackedCellSet {
    level: u32,
    bytes: Vec<u8>,
}

#[cfg(feature = "serde")]
impl From<CellSet> for PackedCellSet {
    fn from(set: CellSet) -> Self {
        Self {
            level: set.level,
            bytes: set.to_bytes(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<PackedCellSet> for CellSet {
    type Error = GridError;

    fn try_from(packed: PackedCellSet) -> Result<Self> {
        CellSet::from_bytes(&packed.bytes, packed.level)
    }
}

/// Positions of the set bits of a word, lowest first
struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}
