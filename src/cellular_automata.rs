//! Per-cell masked cave cellular automata.

use crate::ca_prep::{CellConnector, CellTask};
use crate::error::{Error, Result};
use crate::grid2d::Grid2D;
use crate::seed::Rng;

const FLOOR: u8 = 0;
const WALL: u8 = 1;

/// Validated CA rule parameters. Construct via [`CaConfig::new`] — `kernel_size` is rounded up
/// to the next odd value, and `birth_limit`/`survival_limit` are clamped to `[0, kernel²−1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaConfig {
    pub kernel_size: u32,
    pub birth_limit: u32,
    pub survival_limit: u32,
    pub iterations: u32,
    pub initial_wall_probability: f64,
    pub connector_depth: u32,
}

impl CaConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidKernelSize`] if `kernel_size` is still `< 3` after rounding even
    /// values up to the next odd value.
    pub fn new(
        kernel_size: u32,
        birth_limit: u32,
        survival_limit: u32,
        iterations: u32,
        initial_wall_probability: f64,
        connector_depth: u32,
    ) -> Result<Self> {
        let kernel_size = if kernel_size % 2 == 0 {
            kernel_size + 1
        } else {
            kernel_size
        };
        if kernel_size < 3 {
            return Err(Error::InvalidKernelSize(kernel_size));
        }
        let max_neighbors = kernel_size * kernel_size - 1;
        Ok(Self {
            kernel_size,
            birth_limit: birth_limit.min(max_neighbors),
            survival_limit: survival_limit.min(max_neighbors),
            iterations,
            initial_wall_probability: initial_wall_probability.clamp(0.0, 1.0),
            connector_depth,
        })
    }
}

/// Per-cell CA output: pass-through region/connectors plus the final `tiles` grid (1 = wall).
#[derive(Debug, Clone)]
pub struct CaResult {
    pub cell_index: usize,
    pub region_x0: i32,
    pub region_y0: i32,
    pub tiles: Grid2D<u8>,
    pub connectors: Vec<CellConnector>,
}

fn bresenham_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

fn build_carve_mask(task: &CellTask, config: &CaConfig) -> Grid2D<u8> {
    let mut carve = Grid2D::new(task.region_w as usize, task.region_h as usize);
    for connector in &task.connectors {
        let (sx, sy) = connector.local_point;
        let depth = config.connector_depth as f64;
        let ex = sx + (connector.direction_into_cell.x * depth).round() as i32;
        let ey = sy + (connector.direction_into_cell.y * depth).round() as i32;

        let line = bresenham_line(sx, sy, ex, ey);
        for &(x, y) in line.iter().take(config.connector_depth as usize + 1) {
            if x < 0 || y < 0 || x >= task.region_w || y >= task.region_h {
                continue;
            }
            if task.mask[(x as usize, y as usize)] == 0 {
                continue;
            }
            carve.set(x, y, 1u8);
        }
    }
    carve
}

fn initial_fill(task: &CellTask, carve: &Grid2D<u8>, config: &CaConfig) -> Grid2D<u8> {
    let mut tiles = Grid2D::new(task.region_w as usize, task.region_h as usize);
    let mut rng = Rng::new(task.ca_seed);

    for y in 0..task.region_h {
        for x in 0..task.region_w {
            let (xu, yu) = (x as usize, y as usize);
            let value = if carve[(xu, yu)] == 1 {
                FLOOR
            } else if task.mask[(xu, yu)] == 0 {
                WALL
            } else if rng.next_f32() < config.initial_wall_probability as f32 {
                WALL
            } else {
                FLOOR
            };
            tiles.set(x, y, value);
        }
    }
    tiles
}

fn count_wall_neighbors(
    tiles: &Grid2D<u8>,
    mask: &Grid2D<u8>,
    carve: &Grid2D<u8>,
    x: i32,
    y: i32,
    kernel_size: u32,
) -> u32 {
    let half = (kernel_size / 2) as i32;
    let mut count = 0u32;
    for dy in -half..=half {
        for dx in -half..=half {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x + dx;
            let ny = y + dy;
            if !tiles.in_bounds(nx, ny) {
                count += 1;
                continue;
            }
            let (nxu, nyu) = (nx as usize, ny as usize);
            if carve[(nxu, nyu)] == 1 {
                continue;
            }
            if mask[(nxu, nyu)] == 0 {
                count += 1;
                continue;
            }
            count += u32::from(tiles[(nxu, nyu)]);
        }
    }
    count
}

fn step(
    current: &Grid2D<u8>,
    mask: &Grid2D<u8>,
    carve: &Grid2D<u8>,
    config: &CaConfig,
) -> Grid2D<u8> {
    let mut next = Grid2D::new(current.width(), current.height());
    for y in 0..current.height() as i32 {
        for x in 0..current.width() as i32 {
            let (xu, yu) = (x as usize, y as usize);
            let value = if carve[(xu, yu)] == 1 {
                FLOOR
            } else if mask[(xu, yu)] == 0 {
                WALL
            } else {
                let neighbors = count_wall_neighbors(current, mask, carve, x, y, config.kernel_size);
                let currently_wall = current[(xu, yu)] == WALL;
                if currently_wall {
                    u8::from(neighbors >= config.survival_limit)
                } else {
                    u8::from(neighbors >= config.birth_limit)
                }
            };
            next.set(x, y, value);
        }
    }
    next
}

/// Runs the masked CA for one cell to completion. Deterministic given `task` and `config`,
/// independent of which thread executes it.
#[must_use]
pub fn run(task: &CellTask, config: &CaConfig) -> CaResult {
    let carve = build_carve_mask(task, config);
    let mut tiles = initial_fill(task, &carve, config);

    for _ in 0..config.iterations {
        tiles = step(&tiles, &task.mask, &carve, config);
    }

    CaResult {
        cell_index: task.cell_index,
        region_x0: task.region_x0,
        region_y0: task.region_y0,
        tiles,
        connectors: task.connectors.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn blank_task(w: i32, h: i32) -> CellTask {
        let mut mask = Grid2D::new(w as usize, h as usize);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y, 1u8);
            }
        }
        CellTask {
            cell_index: 0,
            region_x0: 0,
            region_y0: 0,
            region_w: w,
            region_h: h,
            mask,
            connectors: Vec::new(),
            ca_seed: 12345,
            seed_position: Point::new(w as f64 / 2.0, h as f64 / 2.0),
        }
    }

    #[test]
    fn rejects_kernel_below_three_after_rounding() {
        assert!(CaConfig::new(1, 4, 3, 2, 0.45, 3).is_err());
    }

    #[test]
    fn rounds_even_kernel_up_to_odd() {
        let config = CaConfig::new(4, 4, 3, 2, 0.45, 3).unwrap();
        assert_eq!(config.kernel_size, 5);
    }

    #[test]
    fn zero_iterations_matches_initial_fill_rule() {
        let task = blank_task(10, 10);
        let config = CaConfig::new(5, 4, 3, 0, 1.0, 3).unwrap();
        let result = run(&task, &config);
        // initial_wall_probability == 1.0 with a fully-open mask and no carve forces every
        // cell to wall.
        for (_, _, v) in result.tiles.iter() {
            assert_eq!(*v, WALL);
        }
    }

    #[test]
    fn masked_out_cells_are_always_wall() {
        let mut task = blank_task(6, 6);
        task.mask.set(0, 0, 0u8);
        let config = CaConfig::new(3, 4, 3, 3, 0.4, 2).unwrap();
        let result = run(&task, &config);
        assert_eq!(result.tiles[(0, 0)], WALL);
    }

    #[test]
    fn is_deterministic_for_identical_input() {
        let task = blank_task(12, 12);
        let config = CaConfig::new(5, 4, 3, 4, 0.42, 3).unwrap();
        let a = run(&task, &config);
        let b = run(&task, &config);
        assert_eq!(a.tiles.as_slice(), b.tiles.as_slice());
    }

    #[test]
    fn carved_connector_cells_stay_floor() {
        let mut task = blank_task(10, 10);
        task.connectors.push(CellConnector {
            other_cell: 1,
            edge_index: 0,
            world_point: Point::new(5.0, 5.0),
            local_point: (5, 5),
            direction_into_cell: Point::new(1.0, 0.0),
        });
        let config = CaConfig::new(5, 4, 3, 5, 0.9, 3).unwrap();
        let result = run(&task, &config);
        assert_eq!(result.tiles[(5usize, 5usize)], FLOOR);
    }
}
