//! Demonstration of grid topology queries

use std::time::Instant;

use geodesic_grid::*;

fn main() -> Result<()> {
    println!("Building grid...");

    let config = GridConfigBuilder::new()
        .resolution(GridResolution::Medium)?
        .prewarm(true)
        .build()?;

    let start = Instant::now();
    let grid = Grid::new(config);
    println!(
        "Prewarmed {} cells (level {}) in {:.2?}",
        grid.cell_count(),
        grid.level(),
        start.elapsed()
    );

    // Cell counts per level
    println!("\nCells per level:");
    for level in 0..=grid.level() {
        println!("  Level {}: {}", level, Cell::count_at_level(level));
    }

    // Look up the cell under a direction
    let direction = Vec3::new(0.4, 0.7, -0.2);
    let cell = grid.containing(direction, grid.level());
    println!("\nDirection {:?} is in {} (level {})", direction, cell, cell.level());
    println!("  Position: {:?}", grid.position(cell));

    // Show ancestry
    if cell.level() > 0 {
        println!(
            "  Parents: {} and {} ({:?} edge)",
            cell.first_parent(),
            grid.second_parent(cell),
            cell.direction()
        );
    }

    // Show neighbors
    let neighbors = grid.neighbors(cell, grid.level());
    println!("  {} neighbors:", neighbors.len());
    for neighbor in &neighbors {
        println!(
            "    {} at {:.4} rad",
            neighbor,
            grid.angular_distance(cell, *neighbor)
        );
    }

    // Show cells within hops
    for hops in 1..=3 {
        let nearby = grid.cells_within_hops(cell, hops, grid.level());
        println!("Found {} cells within {} hops of {}", nearby.len(), hops, cell);
    }

    // The twelve pentagons
    println!("\nPentagons:");
    for pentagon in Cell::at_level(0) {
        println!(
            "  {} has {} neighbors at level {}",
            pentagon,
            grid.neighbors(pentagon, grid.level()).len(),
            grid.level()
        );
    }

    Ok(())
}
