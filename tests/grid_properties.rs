//! Property-based tests for grid topology and containers.
//!
//! Run with: cargo test --test grid_properties

use geodesic_grid::{BoundsMap, Cell, CellSet, ChildType, Grid, Ray, Triangle};
use proptest::prelude::*;

thread_local! {
    static GRID: Grid = Grid::default();
}

// =============================================================================
// Strategies
// =============================================================================

/// A level and a cell that exists at that level
fn arb_cell(max_level: u32) -> impl Strategy<Value = (u32, Cell)> {
    (0..=max_level).prop_flat_map(|level| {
        (Just(level), (0..Cell::count_at_level(level)).prop_map(Cell::new))
    })
}

fn arb_direction() -> impl Strategy<Value = ChildType> {
    prop::sample::select(ChildType::ALL.to_vec())
}

/// A level and a membership pattern covering every cell of it
fn arb_membership(max_level: u32) -> impl Strategy<Value = (u32, Vec<bool>)> {
    (0..=max_level).prop_flat_map(|level| {
        let count = Cell::count_at_level(level) as usize;
        (Just(level), prop::collection::vec(any::<bool>(), count))
    })
}

// =============================================================================
// Index arithmetic
// =============================================================================

proptest! {
    #[test]
    fn level_matches_index_range((level, cell) in arb_cell(12)) {
        let own = cell.level();
        prop_assert!(own <= level);
        if own > 0 {
            prop_assert!(cell.index() >= Cell::count_at_level(own - 1));
        }
        prop_assert!(cell.index() < Cell::count_at_level(own));
    }

    #[test]
    fn parent_child_round_trip(index in 12u64..Cell::count_at_level(12)) {
        let cell = Cell::new(index);
        let parent = cell.first_parent();
        prop_assert_eq!(parent.child(cell.direction(), cell.level()), cell);
    }

    #[test]
    fn approach_matches_repeated_children(
        (level, cell) in arb_cell(4),
        direction in arb_direction(),
        steps in 0u32..6,
    ) {
        prop_assume!(!cell.is_polar());
        let mut expected = cell;
        for step in 0..steps {
            expected = expected.child(direction, level + step + 1);
        }
        prop_assert_eq!(cell.approach(direction, level, steps), expected);
    }

    #[test]
    fn triangle_index_round_trip(index in 0u64..Triangle::count_at_level(8)) {
        prop_assert_eq!(Triangle::from_index(index).index(), index);
    }
}

// =============================================================================
// Topology
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn neighbors_are_symmetric((level, cell) in arb_cell(6)) {
        GRID.with(|grid| -> Result<(), TestCaseError> {
            let neighbors = grid.neighbors(cell, level);
            prop_assert_eq!(neighbors.len(), if cell.is_pentagon() { 5 } else { 6 });
            for neighbor in neighbors {
                prop_assert!(neighbor.index() < Cell::count_at_level(level));
                prop_assert!(grid.neighbors(neighbor, level).contains(&cell));
            }
            Ok(())
        })?;
    }

    #[test]
    fn positions_are_unit((_level, cell) in arb_cell(7)) {
        GRID.with(|grid| -> Result<(), TestCaseError> {
            let length = grid.position(cell).length();
            prop_assert!((length - 1.0).abs() < 1e-5, "{} has length {}", cell, length);
            Ok(())
        })?;
    }

    #[test]
    fn containing_recovers_cell((level, cell) in arb_cell(6)) {
        GRID.with(|grid| -> Result<(), TestCaseError> {
            prop_assert_eq!(grid.containing(grid.position(cell), level), cell);
            Ok(())
        })?;
    }

    #[test]
    fn second_parent_neighbors_first(index in 12u64..Cell::count_at_level(6)) {
        let cell = Cell::new(index);
        GRID.with(|grid| -> Result<(), TestCaseError> {
            let second = grid.second_parent(cell);
            let coarser = cell.level() - 1;
            prop_assert!(grid.neighbors(cell.first_parent(), coarser).contains(&second));
            Ok(())
        })?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn radial_ray_hits_cell((_level, cell) in arb_cell(4), bump in 0.0f32..0.02) {
        GRID.with(|grid| -> Result<(), TestCaseError> {
            let height = |c: Cell| 1.0 + if c == cell { bump } else { 0.0 };
            let bounds = BoundsMap::build(grid, 4, &height);
            let target = grid.position(cell) * height(cell);
            let ray = Ray::towards(grid.position(cell) * 3.0, target);
            prop_assert_eq!(grid.raycast(&ray, 4, &bounds, &height, None), Some(cell));
            Ok(())
        })?;
    }
}

// =============================================================================
// Containers
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cell_set_byte_round_trip((level, members) in arb_membership(4)) {
        let mut set = CellSet::new(level);
        for (index, &member) in members.iter().enumerate() {
            set.set(Cell::new(index as u64), member);
        }
        prop_assert_eq!(set.len(), members.iter().filter(|&&m| m).count());

        let restored = CellSet::from_bytes(&set.to_bytes(), level).unwrap();
        for (index, &member) in members.iter().enumerate() {
            prop_assert_eq!(restored.contains(Cell::new(index as u64)), member);
        }
        prop_assert_eq!(restored, set);
    }
}
