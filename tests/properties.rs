//! Cross-module invariants from the pipeline's testable-properties contract.

use caveforge::config::GenerateParams;
use caveforge::geometry::Point;

fn params(base_seed: u64) -> GenerateParams {
    let mut p = GenerateParams::default();
    p.base_seed = base_seed;
    p.canvas_width = 48;
    p.canvas_height = 48;
    p.poisson.radius = 10.0;
    p.traversal.neighbor_coverage = 0.6;
    p
}

#[test]
fn ownership_grid_matches_nearest_seed_with_index_tiebreak() {
    let result = caveforge::generate(&params(9)).unwrap();
    let diagram = &result.diagram;

    for (x, y, owner) in diagram.ownership_grid.iter() {
        let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
        let mut best_idx = 0usize;
        let mut best_dist = center.distance_sq(&diagram.seeds[0]);
        for (idx, seed) in diagram.seeds.iter().enumerate().skip(1) {
            let d = center.distance_sq(seed);
            if d < best_dist {
                best_dist = d;
                best_idx = idx;
            }
        }
        assert_eq!(*owner, best_idx as i32);
    }
}

#[test]
fn poisson_seeds_respect_minimum_separation() {
    let result = caveforge::generate(&params(13)).unwrap();
    let seeds = &result.diagram.seeds;
    for i in 0..seeds.len() {
        for j in (i + 1)..seeds.len() {
            assert!(seeds[i].distance(&seeds[j]) >= 10.0 - 1e-6);
        }
    }
}

#[test]
fn every_cell_mask_covers_its_owned_pixels() {
    let result = caveforge::generate(&params(21)).unwrap();
    let diagram = &result.diagram;

    let mut global_owned_counts = vec![0usize; diagram.seeds.len()];
    for (_, _, owner) in diagram.ownership_grid.iter() {
        if *owner >= 0 {
            global_owned_counts[*owner as usize] += 1;
        }
    }

    for task_result in &result.per_cell_results {
        let mut owned_in_region = 0usize;
        for y in 0..task_result.tiles.height() as i32 {
            for x in 0..task_result.tiles.width() as i32 {
                let wx = task_result.region_x0 + x;
                let wy = task_result.region_y0 + y;
                if diagram.ownership_grid.get(wx, wy) == Some(&(task_result.cell_index as i32)) {
                    owned_in_region += 1;
                }
            }
        }
        assert_eq!(owned_in_region, global_owned_counts[task_result.cell_index]);
    }
}

#[test]
fn merged_grid_takes_values_from_the_owning_cells_result() {
    let result = caveforge::generate(&params(27)).unwrap();
    for cell_result in &result.per_cell_results {
        for y in 0..cell_result.tiles.height() as i32 {
            for x in 0..cell_result.tiles.width() as i32 {
                let wx = cell_result.region_x0 + x;
                let wy = cell_result.region_y0 + y;
                if result.diagram.ownership_grid.get(wx, wy) == Some(&(cell_result.cell_index as i32)) {
                    let merged_value = result.merged[(wx as usize, wy as usize)];
                    let tile_value = cell_result.tiles[(x as usize, y as usize)];
                    assert_eq!(merged_value, tile_value);
                }
            }
        }
    }
}
