//! Demonstration of per-cell containers

use geodesic_grid::*;

fn main() -> Result<()> {
    let grid = Grid::new(GridConfigBuilder::new().level(4)?.build()?);
    let level = grid.level();

    // Latitude bands stored per cell
    let latitude = CellMap::from_fn(level, |cell| grid.position(cell).y.asin().to_degrees());
    let polar = latitude.values().filter(|lat| lat.abs() > 60.0).count();
    println!(
        "{} of {} cells lie above 60° latitude",
        polar,
        latitude.len()
    );

    // Sparse writes into a dense map
    let mut deposits: CellMap<f64> = grid.cell_map();
    deposits[Cell::new(50)] = 5.0;
    let stocked = deposits.iter().filter(|(_, amount)| **amount > 0.0).count();
    println!("{} cell(s) hold deposits", stocked);

    // Explored region as a set
    let start = grid.containing(Vec3::new(1.0, 0.2, 0.3), level);
    let mut explored = grid.cell_set();
    for cell in grid.cells_within_hops(start, 4, level) {
        explored.insert(cell);
    }
    println!("\nExplored {} cells around {}", explored.len(), start);

    // Persist and restore
    let bytes = explored.to_bytes();
    println!(
        "Serialized to {} bytes for {} cells",
        bytes.len(),
        explored.capacity()
    );
    let restored = CellSet::from_bytes(&bytes, level)?;
    assert_eq!(restored, explored);
    println!("Restored set matches: {} members", restored.len());

    // Corrupted input is rejected
    match CellSet::from_bytes(&bytes[1..], level) {
        Ok(_) => println!("Truncated buffer unexpectedly accepted"),
        Err(err) => println!("Truncated buffer rejected: {}", err),
    }

    Ok(())
}
