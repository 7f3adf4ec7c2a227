//! Poisson-disk (blue noise) sampling via Bridson's algorithm.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::seed::Rng;

/// Samples a blue-noise point set inside `[0, width) × [0, height)`.
///
/// `attempts` bounds the number of annulus candidates drawn per active sample (the spec's `K`,
/// default 30). All randomness is drawn from `rng_seed`; identical inputs produce an
/// identical, order-stable point sequence.
///
/// # Errors
///
/// Returns [`Error::InvalidPoissonRadius`] if `radius <= 0.0`.
pub fn sample(width: f64, height: f64, radius: f64, attempts: u32, rng_seed: u64) -> Result<Vec<Point>> {
    if radius <= 0.0 {
        return Err(Error::InvalidPoissonRadius(radius));
    }

    let mut rng = Rng::new(rng_seed);
    let cell_size = radius / std::f64::consts::SQRT_2;
    let grid_w = (width / cell_size).ceil() as usize + 1;
    let grid_h = (height / cell_size).ceil() as usize + 1;

    // grid[y * grid_w + x] holds the index into `points` occupying that bucket, if any.
    let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];
    let mut points: Vec<Point> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let to_cell = |p: Point| -> (usize, usize) {
        (
            (p.x / cell_size) as usize,
            (p.y / cell_size) as usize,
        )
    };

    let first = Point::new(
        rng.next_f32() as f64 * width,
        rng.next_f32() as f64 * height,
    );
    let (gx, gy) = to_cell(first);
    grid[gy * grid_w + gx] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() {
        let pick = rng.next_int(0, active.len() as i64 - 1) as usize;
        let origin = points[active[pick]];
        let mut found = false;

        for _ in 0..attempts {
            let u = rng.next_f32() as f64;
            let v = rng.next_f32() as f64;
            let dist = radius * (1.0 + u.sqrt());
            let angle = std::f64::consts::TAU * v;
            let candidate = Point::new(origin.x + angle.cos() * dist, origin.y + angle.sin() * dist);

            if candidate.x < 0.0 || candidate.x >= width || candidate.y < 0.0 || candidate.y >= height {
                continue;
            }

            let (cgx, cgy) = to_cell(candidate);
            let mut valid = true;
            'neighbors: for dy in -2..=2_i64 {
                for dx in -2..=2_i64 {
                    let nx = cgx as i64 + dx;
                    let ny = cgy as i64 + dy;
                    if nx < 0 || ny < 0 || nx as usize >= grid_w || ny as usize >= grid_h {
                        continue;
                    }
                    if let Some(idx) = grid[ny as usize * grid_w + nx as usize] {
                        if candidate.distance(&points[idx]) < radius {
                            valid = false;
                            break 'neighbors;
                        }
                    }
                }
            }

            if valid {
                let new_index = points.len();
                points.push(candidate);
                grid[cgy * grid_w + cgx] = Some(new_index);
                active.push(new_index);
                found = true;
                break;
            }
        }

        if !found {
            active.swap_remove(pick);
        }
    }

    Ok(points)
}
