use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{capacity, slot};
use crate::cell::Cell;
#[cfg(feature = "serde")]
use crate::cell::MAX_LEVEL;
#[cfg(feature = "serde")]
use crate::error::GridError;

/// One value per cell, for every cell up to a level
///
/// # Example
///
/// ```rust
/// use geodesic_grid::*;
///
/// let mut elevation: CellMap<f32> = CellMap::new(2);
/// elevation[Cell::new(50)] = 5.0;
///
/// assert_eq!(elevation.len(), 162);
/// assert_eq!(elevation.values().filter(|&&h| h == 5.0).count(), 1);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCellMap<T>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct CellMap<T> {
    level: u32,
    values: Vec<T>,
}

impl<T: Default + Clone> CellMap<T> {
    /// Map with every value set to `T::default()`
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`](crate::MAX_LEVEL).
    pub fn new(level: u32) -> Self {
        Self::filled(level, T::default())
    }
}

impl<T: Clone> CellMap<T> {
    /// Map with every value set to `value`
    pub fn filled(level: u32, value: T) -> Self {
        Self {
            level,
            values: vec![value; capacity(level)],
        }
    }
}

impl<T> CellMap<T> {
    /// Map with one value computed per cell, in ascending index order
    pub fn from_fn(level: u32, f: impl FnMut(Cell) -> T) -> Self {
        let mut values = Vec::with_capacity(capacity(level));
        values.extend(Cell::at_level(level).map(f));
        Self { level, values }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of cells covered (always `count_at_level(level)`)
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `cell`, or `None` if the cell is finer than the map
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.values.get(cell.index() as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.values.get_mut(cell.index() as usize)
    }

    /// `(cell, value)` pairs in ascending index order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Cell, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (Cell::new(index as u64), value))
    }

    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Cell, &mut T)> + '_ {
        self.values
            .iter_mut()
            .enumerate()
            .map(|(index, value)| (Cell::new(index as u64), value))
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Backing slice, indexed by cell index
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> Index<Cell> for CellMap<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, cell: Cell) -> &T {
        &self.values[slot(cell, self.level, self.values.len())]
    }
}

impl<T> IndexMut<Cell> for CellMap<T> {
    #[track_caller]
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        let at = slot(cell, self.level, self.values.len());
        &mut self.values[at]
    }
}

/// Unvalidated wire form of [`CellMap`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawCellMap<T> {
    level: u32,
    values: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawCellMap<T>> for CellMap<T> {
    type Error = GridError;

    fn try_from(raw: RawCellMap<T>) -> Result<Self, GridError> {
        if raw.level > MAX_LEVEL {
            return Err(GridError::LevelOutOfRange {
                level: raw.level,
                max: MAX_LEVEL,
            });
        }
        let expected = capacity(raw.level);
        if raw.values.len() != expected {
            return Err(GridError::InvalidValueCount {
                expected,
                actual: raw.values.len(),
            });
        }
        Ok(Self {
            level: raw.level,
            values: raw.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_write() {
        let mut map: CellMap<f64> = CellMap::new(2);
        assert_eq!(map.len(), 162);
        assert!(map.values().all(|&v| v == 0.0));

        map[Cell::new(50)] = 5.0;

        let fives = map.iter().filter(|(_, v)| **v == 5.0).count();
        let zeros = map.iter().filter(|(_, v)| **v == 0.0).count();
        assert_eq!(fives, 1);
        assert_eq!(zeros, 161);
        assert_eq!(map.iter().len(), 162);
    }

    #[test]
    fn test_iteration_order() {
        let map = CellMap::from_fn(1, |cell| cell.index());
        for (cell, &value) in map.iter() {
            assert_eq!(cell.index(), value);
        }
        assert_eq!(map.as_slice()[41], 41);
    }

    #[test]
    fn test_filled_and_iter_mut() {
        let mut map = CellMap::filled(0, 1u32);
        for (cell, value) in map.iter_mut() {
            if cell.is_polar() {
                *value = 0;
            }
        }
        assert_eq!(map.values().sum::<u32>(), 10);
        assert_eq!(map.level(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut map: CellMap<i32> = CellMap::new(1);
        assert!(map.get(Cell::new(41)).is_some());
        assert!(map.get(Cell::new(42)).is_none());
        assert!(map.get_mut(Cell::new(42)).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range_panics() {
        let map: CellMap<i32> = CellMap::new(1);
        let _ = map[Cell::new(42)];
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_map_serialization() {
        let map = CellMap::from_fn(1, |cell| cell.index() as f32 * 0.5);
        let json = serde_json::to_string(&map).unwrap();
        let restored: CellMap<f32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, restored);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_map_deserialize_validates() {
        let short = serde_json::from_str::<CellMap<f32>>(r#"{"level":1,"values":[1.0]}"#)
            .unwrap_err();
        assert!(short.to_string().contains("expected 42, got 1"), "{short}");

        let deep = serde_json::from_str::<CellMap<u8>>(r#"{"level":40,"values":[]}"#).unwrap_err();
        assert!(deep.to_string().contains("out of range"), "{deep}");

        let values = vec![7u8; 12];
        let json = serde_json::to_string(&serde_json::json!({ "level": 0, "values": values }))
            .unwrap();
        let map: CellMap<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(map[Cell::SOUTH], 7);
    }
}
