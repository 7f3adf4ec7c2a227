//! Converts a [`VoronoiDiagram`] and [`TraversalGraph`] into per-cell [`CellTask`]s ready for
//! masked cellular automata.

use crate::geometry::Point;
use crate::grid2d::Grid2D;
use crate::seed::SeedChain;
use crate::traversal::TraversalGraph;
use crate::voronoi::VoronoiDiagram;

/// One connector: a point where traversal crosses into this cell from a neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellConnector {
    pub other_cell: usize,
    pub edge_index: usize,
    pub world_point: Point,
    pub local_point: (i32, i32),
    pub direction_into_cell: Point,
}

/// Immutable per-cell CA input, produced once and consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct CellTask {
    pub cell_index: usize,
    pub region_x0: i32,
    pub region_y0: i32,
    pub region_w: i32,
    pub region_h: i32,
    pub mask: Grid2D<u8>,
    pub connectors: Vec<CellConnector>,
    pub ca_seed: u64,
    pub seed_position: Point,
}

fn clamp_local(value: i32, max_exclusive: i32) -> i32 {
    value.clamp(0, (max_exclusive - 1).max(0))
}

/// Builds one [`CellTask`] per cell in `diagram`, padding each cell's AABB by `padding` pixels.
#[must_use]
pub fn prepare(
    diagram: &VoronoiDiagram,
    traversal: &TraversalGraph,
    padding: i32,
    seed_chain: &SeedChain,
) -> Vec<CellTask> {
    diagram
        .cells
        .iter()
        .map(|cell| {
            let region = cell
                .bbox
                .pad_and_clamp(padding, diagram.width, diagram.height);
            let region_w = region.width();
            let region_h = region.height();

            let mut mask = Grid2D::new(region_w as usize, region_h as usize);
            for y in 0..region_h {
                for x in 0..region_w {
                    let owner = diagram
                        .ownership_grid
                        .get(region.x0 + x, region.y0 + y)
                        .copied()
                        .unwrap_or(-1);
                    if owner == cell.seed_index as i32 {
                        mask.set(x, y, 1u8);
                    }
                }
            }

            let mut connectors: Vec<CellConnector> = Vec::new();
            for connection in &traversal.connections {
                let other_cell = if connection.cell_a == cell.seed_index {
                    Some(connection.cell_b)
                } else if connection.cell_b == cell.seed_index {
                    Some(connection.cell_a)
                } else {
                    None
                };
                let Some(other_cell) = other_cell else {
                    continue;
                };

                let world_point = connection.point_on_edge;
                let local_x = clamp_local(
                    world_point.x.floor() as i32 - region.x0,
                    region_w,
                );
                let local_y = clamp_local(
                    world_point.y.floor() as i32 - region.y0,
                    region_h,
                );

                let direction_into_cell = cell
                    .seed
                    .sub(&world_point)
                    .normalized()
                    .unwrap_or_else(|| Point::new(1.0, 0.0));

                connectors.push(CellConnector {
                    other_cell,
                    edge_index: connection.edge_index,
                    world_point,
                    local_point: (local_x, local_y),
                    direction_into_cell,
                });
            }

            CellTask {
                cell_index: cell.seed_index,
                region_x0: region.x0,
                region_y0: region.y0,
                region_w,
                region_h,
                mask,
                connectors,
                ca_seed: seed_chain.ca_seed(cell.seed_index),
                seed_position: cell.seed,
            }
        })
        .collect()
}
