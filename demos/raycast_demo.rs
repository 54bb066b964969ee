//! Demonstration of raycasting against a displaced grid surface

use std::time::Instant;

use geodesic_grid::*;
use glam::{Affine3A, Quat};

/// Cheap rolling hills from the cell position
fn hills(grid: &Grid, cell: Cell) -> f32 {
    let p = grid.position(cell);
    1.0 + 0.02 * (p.x * 9.0).sin() * (p.z * 7.0).cos() + 0.01 * (p.y * 13.0).sin()
}

fn main() -> Result<()> {
    let config = GridConfigBuilder::new().level(6)?.build()?;
    let grid = Grid::new(config);
    let level = grid.level();

    println!("Sampling heights for {} cells...", grid.cell_count());
    let heights = CellMap::from_fn(level, |cell| hills(&grid, cell));

    let start = Instant::now();
    let bounds = BoundsMap::build(&grid, level, &heights);
    println!("Built bounds map to level {} in {:.2?}", bounds.level(), start.elapsed());

    // Rays straight down from orbit
    println!("\nRays from orbit:");
    println!("{:-<60}", "");
    let targets = [
        (Vec3::Y, "North Pole"),
        (Vec3::NEG_Y, "South Pole"),
        (Vec3::X, "Equator (0°)"),
        (Vec3::Z, "Equator (90°)"),
        (Vec3::new(0.5, 0.5, 0.5).normalize(), "Mid-latitude"),
    ];
    for (direction, label) in targets {
        let ray = Ray::towards(direction * 3.0, Vec3::ZERO);
        match grid.raycast_hit(&ray, level, &bounds, &heights, None) {
            Some(hit) => println!(
                "{:15} -> {} at distance {:.4} (height {:.4})",
                label, hit.cell, hit.distance, heights[hit.cell]
            ),
            None => println!("{:15} -> miss", label),
        }
    }

    // A grazing ray and a clear miss
    let grazing = Ray::new(Vec3::new(-3.0, 1.0, 0.0), Vec3::X);
    println!("\nGrazing ray: {:?}", grid.raycast(&grazing, level, &bounds, &heights, None));
    let miss = Ray::new(Vec3::new(-3.0, 2.0, 0.0), Vec3::X);
    println!("Missing ray: {:?}", grid.raycast(&miss, level, &bounds, &heights, None));

    // Planet placed in a world
    let transform = Affine3A::from_scale_rotation_translation(
        Vec3::splat(6371.0),
        Quat::from_rotation_y(0.3),
        Vec3::new(0.0, -6371.0, 0.0),
    );
    let camera = Ray::new(Vec3::new(0.0, 500.0, 0.0), Vec3::new(0.1, -1.0, 0.0));
    if let Some(hit) = grid.raycast_hit(&camera, level, &bounds, &heights, Some(&transform)) {
        println!(
            "\nWorld camera ray hits {} at {:?} ({:.1} units away)",
            hit.cell, hit.point, hit.distance
        );
    }

    // Throughput
    let count = 1000;
    let start = Instant::now();
    let mut hits = 0;
    for i in 0..count {
        let angle = i as f32 * 0.017;
        let origin = Vec3::new(angle.cos() * 3.0, (angle * 0.37).sin(), angle.sin() * 3.0);
        if grid.raycast(&Ray::towards(origin, Vec3::ZERO), level, &bounds, &heights, None).is_some() {
            hits += 1;
        }
    }
    println!("\n{} of {} rays hit in {:.2?}", hits, count, start.elapsed());

    Ok(())
}
