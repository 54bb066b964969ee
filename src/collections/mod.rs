//! Dense per-cell containers
//!
//! Both containers are sized for every cell up to a fixed level and addressed
//! directly by [`Cell::index`](crate::Cell::index). Indexing a cell finer than
//! the container's level is a programmer error and panics.

mod map;
mod set;

pub use map::CellMap;
pub use set::CellSet;

use crate::cell::{Cell, MAX_LEVEL};

#[inline]
fn capacity(level: u32) -> usize {
    assert!(
        level <= MAX_LEVEL,
        "container level {} exceeds MAX_LEVEL ({})",
        level,
        MAX_LEVEL
    );
    Cell::count_at_level(level) as usize
}

#[inline]
#[track_caller]
fn slot(cell: Cell, level: u32, len: usize) -> usize {
    let index = cell.index() as usize;
    assert!(
        index < len,
        "{} is out of range for a level {} container of {} cells",
        cell,
        level,
        len
    );
    index
}
