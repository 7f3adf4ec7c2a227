//! Voronoi diagram construction: Delaunay triangulation, edge clipping, per-cell adjacency, and
//! the brute-force ownership grid.

use std::collections::{BTreeSet, HashMap};

use crate::delaunay::{self, Triangle};
use crate::geometry::{liang_barsky_clip, IRect, Point};
use crate::grid2d::Grid2D;

/// An undirected Voronoi edge in canvas space, already clipped to `[0, size) × [0, size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
    pub seed_a: usize,
    pub seed_b: usize,
    pub is_border: bool,
}

impl Edge {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.from.distance(&self.to)
    }
}

/// One Voronoi cell: a seed, its neighbours, the edges bounding it, and its integer AABB.
#[derive(Debug, Clone)]
pub struct Cell {
    pub seed_index: usize,
    pub seed: Point,
    pub neighbors: BTreeSet<usize>,
    pub edge_indices: Vec<usize>,
    pub bbox: IRect,
}

/// The full diagram: immutable after [`build`] returns.
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    pub width: i32,
    pub height: i32,
    pub seeds: Vec<Point>,
    pub cells: Vec<Cell>,
    pub edges: Vec<Edge>,
    pub triangles: Vec<Triangle>,
    pub ownership_grid: Grid2D<i32>,
}

/// Minimum surviving edge length; anything shorter is discarded as noise from near-degenerate
/// triangles.
const MIN_EDGE_LENGTH: f64 = 0.5;

/// Multiplier applied to `width + height` to produce a ray endpoint far enough outside the
/// canvas that clipping behaves as though the ray were infinite.
const RAY_REACH: f64 = 4.0;

fn rotate90(v: Point) -> Point {
    Point::new(-v.y, v.x)
}

fn seed_bbox(seed: Point) -> IRect {
    IRect::new(
        seed.x.floor() as i32,
        seed.y.floor() as i32,
        seed.x.ceil() as i32,
        seed.y.ceil() as i32,
    )
}

fn ownership_grid(seeds: &[Point], width: i32, height: i32) -> Grid2D<i32> {
    let mut grid = Grid2D::filled(width.max(0) as usize, height.max(0) as usize, -1_i32);
    if seeds.is_empty() {
        return grid;
    }
    for y in 0..height {
        for x in 0..width {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let mut best_idx = 0usize;
            let mut best_dist = center.distance_sq(&seeds[0]);
            for (idx, seed) in seeds.iter().enumerate().skip(1) {
                let d = center.distance_sq(seed);
                if d < best_dist {
                    best_dist = d;
                    best_idx = idx;
                }
            }
            grid.set(x, y, best_idx as i32);
        }
    }
    grid
}

/// Builds a [`VoronoiDiagram`] from `seeds` inside a `width × height` canvas.
#[must_use]
pub fn build(seeds: &[Point], width: i32, height: i32) -> VoronoiDiagram {
    let mut cells: Vec<Cell> = seeds
        .iter()
        .enumerate()
        .map(|(idx, &seed)| Cell {
            seed_index: idx,
            seed,
            neighbors: BTreeSet::new(),
            edge_indices: Vec::new(),
            bbox: seed_bbox(seed),
        })
        .collect();

    let mut edges: Vec<Edge> = Vec::new();
    let mut triangles: Vec<Triangle> = Vec::new();

    if seeds.len() == 2 {
        let a = seeds[0];
        let b = seeds[1];
        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        if let Some(perp) = rotate90(b.sub(&a)).normalized() {
            let reach = (width as f64 + height as f64).max(1.0) * RAY_REACH;
            let p0 = mid.sub(&perp.scale(reach));
            let p1 = mid.add(&perp.scale(reach));
            if let Some((from, to)) = liang_barsky_clip(p0, p1, width as f64, height as f64) {
                if from.distance(&to) >= MIN_EDGE_LENGTH {
                    edges.push(Edge {
                        from,
                        to,
                        seed_a: 0,
                        seed_b: 1,
                        is_border: true,
                    });
                    cells[0].neighbors.insert(1);
                    cells[1].neighbors.insert(0);
                    cells[0].edge_indices.push(0);
                    cells[1].edge_indices.push(0);
                }
            }
        }
    } else if seeds.len() >= 3 {
        triangles = delaunay::triangulate(seeds);

        // edge key (min, max) -> incident (triangle_index, opposite_vertex) pairs, in the order
        // triangles were registered.
        let mut incident: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
        let mut key_order: Vec<(usize, usize)> = Vec::new();

        for (tri_idx, tri) in triangles.iter().enumerate() {
            let v = tri.vertices;
            let tri_edges = [
                (v[0], v[1], v[2]),
                (v[1], v[2], v[0]),
                (v[2], v[0], v[1]),
            ];
            for (a, b, opposite) in tri_edges {
                let key = if a < b { (a, b) } else { (b, a) };
                if !incident.contains_key(&key) {
                    key_order.push(key);
                    cells[key.0].neighbors.insert(key.1);
                    cells[key.1].neighbors.insert(key.0);
                }
                incident.entry(key).or_default().push((tri_idx, opposite));
            }
        }

        for key in key_order {
            let (seed_a, seed_b) = key;
            let hits = &incident[&key];

            let segment = if hits.len() >= 2 {
                let c0 = triangles[hits[0].0].circumcenter;
                let c1 = triangles[hits[1].0].circumcenter;
                Some((c0, c1, false))
            } else {
                let (tri_idx, opposite) = hits[0];
                let circumcenter = triangles[tri_idx].circumcenter;
                let edge_vec = seeds[seed_b].sub(&seeds[seed_a]);
                let perp = match rotate90(edge_vec).normalized() {
                    Some(p) => p,
                    None => continue,
                };
                let midpoint = Point::new(
                    (seeds[seed_a].x + seeds[seed_b].x) / 2.0,
                    (seeds[seed_a].y + seeds[seed_b].y) / 2.0,
                );
                let toward_opposite = perp.x * (seeds[opposite].x - midpoint.x)
                    + perp.y * (seeds[opposite].y - midpoint.y);
                let outward = if toward_opposite > 0.0 {
                    perp.scale(-1.0)
                } else {
                    perp
                };
                let reach = (width as f64 + height as f64).max(1.0) * RAY_REACH;
                let far = circumcenter.add(&outward.scale(reach));
                Some((circumcenter, far, true))
            };

            let Some((p0, p1, _is_ray)) = segment else {
                continue;
            };
            let Some((from, to)) = liang_barsky_clip(p0, p1, width as f64, height as f64) else {
                continue;
            };
            if from.distance(&to) < MIN_EDGE_LENGTH {
                continue;
            }

            let is_border = hits.len() < 2;
            let edge_index = edges.len();
            edges.push(Edge {
                from,
                to,
                seed_a,
                seed_b,
                is_border,
            });
            cells[seed_a].edge_indices.push(edge_index);
            cells[seed_b].edge_indices.push(edge_index);
        }
    }

    for cell in &mut cells {
        let mut bbox = seed_bbox(cell.seed);
        for &edge_idx in &cell.edge_indices {
            let edge = edges[edge_idx];
            bbox = bbox.union_point(edge.from);
            bbox = bbox.union_point(edge.to);
        }
        cell.bbox = bbox.pad_and_clamp(0, width, height);
    }

    VoronoiDiagram {
        width,
        height,
        seeds: seeds.to_vec(),
        cells,
        edges,
        triangles,
        ownership_grid: ownership_grid(seeds, width, height),
    }
}
