//! Wires the pipeline stages together, fans cellular automata out across a worker pool, and
//! merges per-cell results into one canvas-sized grid.

use rayon::prelude::*;

use crate::ca_prep::{self, CellTask};
use crate::cellular_automata::{self, CaConfig, CaResult};
use crate::config::GenerateParams;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::grid2d::Grid2D;
use crate::seed::SeedChain;
use crate::traversal::{self, TraversalGraph};
use crate::voronoi::{self, VoronoiDiagram};

const WALL: u8 = 1;

/// Everything `generate` produces: the diagram, the traversal graph, every per-cell CA result,
/// and the merged canvas-sized tile grid.
#[derive(Debug, Clone)]
pub struct MergedResult {
    pub canvas_width: i32,
    pub canvas_height: i32,
    pub diagram: VoronoiDiagram,
    pub traversal: TraversalGraph,
    pub per_cell_results: Vec<CaResult>,
    pub merged: Grid2D<u8>,
}

fn merge(diagram: &VoronoiDiagram, results: &[CaResult]) -> Grid2D<u8> {
    let mut merged = Grid2D::filled(diagram.width as usize, diagram.height as usize, WALL);
    for r in results {
        for y in 0..r.tiles.height() as i32 {
            for x in 0..r.tiles.width() as i32 {
                let wx = r.region_x0 + x;
                let wy = r.region_y0 + y;
                let Some(&owner) = diagram.ownership_grid.get(wx, wy) else {
                    continue;
                };
                if owner == r.cell_index as i32 {
                    merged.set(wx, wy, r.tiles[(x as usize, y as usize)]);
                }
            }
        }
    }
    merged
}

fn build_worker_pool(parallelism: i32) -> rayon::ThreadPool {
    let num_threads = if parallelism > 0 { parallelism as usize } else { 0 };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("failed to build cellular automata worker pool")
}

/// Runs the full pipeline: seed derivation, Poisson sampling, Voronoi construction, traversal,
/// CA prep, parallel masked CA, and merge.
///
/// # Errors
///
/// Returns [`Error::InvalidCanvasSize`] if `params.canvas_width`/`canvas_height` isn't positive,
/// [`Error::InvalidPoissonRadius`] if `params.poisson.radius <= 0.0`, or
/// [`Error::InvalidKernelSize`] if `params.ca.kernel_size < 3` after rounding.
///
/// # Panics
///
/// Propagates any panic raised inside a CA worker; partial results are never returned.
pub fn generate(params: &GenerateParams) -> Result<MergedResult> {
    if params.canvas_width <= 0 || params.canvas_height <= 0 {
        return Err(Error::InvalidCanvasSize {
            width: params.canvas_width,
            height: params.canvas_height,
        });
    }

    let seed_chain = SeedChain::with_overrides(
        params.base_seed,
        params.poisson_seed_override,
        params.traversal_seed_override,
    );

    let padding = params.poisson.seed_padding;
    let region_w = (params.canvas_width - 2 * padding).max(1) as f64;
    let region_h = (params.canvas_height - 2 * padding).max(1) as f64;
    let raw_points = crate::poisson::sample(
        region_w,
        region_h,
        params.poisson.radius,
        params.poisson.attempts,
        seed_chain.poisson_seed,
    )?;
    let seeds: Vec<Point> = raw_points
        .into_iter()
        .map(|p| Point::new(p.x + padding as f64, p.y + padding as f64))
        .collect();

    let diagram = voronoi::build(&seeds, params.canvas_width, params.canvas_height);
    let traversal = traversal::build(
        &diagram,
        params.traversal.neighbor_coverage,
        seed_chain.traversal_seed,
        params.traversal.include_border_edges,
        params.traversal.connection_distribution_scaling,
    );
    let ca_config = CaConfig::new(
        params.ca.kernel_size,
        params.ca.birth_limit,
        params.ca.survival_limit,
        params.ca.iterations,
        params.ca.initial_wall_probability,
        params.ca.connector_depth,
    )?;

    let tasks: Vec<CellTask> = ca_prep::prepare(&diagram, &traversal, params.cell_padding, &seed_chain);

    let pool = build_worker_pool(params.parallelism);
    let per_cell_results: Vec<CaResult> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| cellular_automata::run(task, &ca_config))
            .collect()
    });

    let merged = merge(&diagram, &per_cell_results);

    Ok(MergedResult {
        canvas_width: params.canvas_width,
        canvas_height: params.canvas_height,
        diagram,
        traversal,
        per_cell_results,
        merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerateParams;

    fn baseline_params(base_seed: u64, parallelism: i32) -> GenerateParams {
        let mut params = GenerateParams::default();
        params.base_seed = base_seed;
        params.canvas_width = 64;
        params.canvas_height = 64;
        params.poisson.radius = 16.0;
        params.traversal.neighbor_coverage = 0.5;
        params.ca.kernel_size = 5;
        params.ca.birth_limit = 4;
        params.ca.survival_limit = 3;
        params.ca.iterations = 4;
        params.parallelism = parallelism;
        params
    }

    #[test]
    fn rejects_nonpositive_canvas() {
        let mut params = baseline_params(1, 1);
        params.canvas_width = 0;
        assert!(matches!(generate(&params), Err(Error::InvalidCanvasSize { .. })));
    }

    #[test]
    fn rejects_nonpositive_poisson_radius() {
        let mut params = baseline_params(1, 1);
        params.poisson.radius = 0.0;
        assert!(matches!(generate(&params), Err(Error::InvalidPoissonRadius(_))));
    }

    #[test]
    fn seed_one_scenario_produces_enough_seeds_and_connected_traversal() {
        let params = baseline_params(1, 1);
        let result = generate(&params).unwrap();
        assert!(result.diagram.seeds.len() >= 6);
        assert!(!result.traversal.connections.is_empty());
    }

    #[test]
    fn parallelism_does_not_change_merged_output() {
        let single = generate(&baseline_params(1, 1)).unwrap();
        let many = generate(&baseline_params(1, 8)).unwrap();
        assert_eq!(single.merged.as_slice(), many.merged.as_slice());
    }

    #[test]
    fn zero_seed_is_normalized_and_matches_itself() {
        let a = generate(&baseline_params(0, 1)).unwrap();
        let b = generate(&baseline_params(0, 1)).unwrap();
        assert_eq!(a.merged.as_slice(), b.merged.as_slice());
    }

    #[test]
    fn small_canvas_with_large_radius_yields_degenerate_map() {
        let mut params = baseline_params(3, 1);
        params.canvas_width = 16;
        params.canvas_height = 16;
        params.poisson.radius = 20.0;
        let result = generate(&params).unwrap();
        assert!(result.diagram.seeds.len() <= 1);
        assert!(result.diagram.edges.is_empty());
    }

    #[test]
    fn full_coverage_connects_all_neighbor_pairs() {
        let mut params = baseline_params(5, 1);
        params.traversal.neighbor_coverage = 1.0;
        let result = generate(&params).unwrap();
        assert_eq!(
            result.traversal.connections.len(),
            result.traversal.total_neighbor_pairs
        );
    }
}
