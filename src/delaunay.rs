//! Bowyer-Watson Delaunay triangulation with a fixed, deterministic insertion order.
//!
//! Insertion order is simply the order points are given in — seeds already come out of Poisson
//! sampling in a fixed, seeded order, so no extra sort is needed for determinism.

use crate::geometry::Point;

/// A Delaunay triangle referencing three vertex indices into the input point slice, with its
/// circumcenter precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub circumcenter: Point,
}

fn circumcenter(a: Point, b: Point, c: Point) -> Point {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-9 {
        return Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;

    let ux = a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y);
    let uy = a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x);

    Point::new(ux / d, uy / d)
}

fn in_circumcircle(points: &[Point], tri: &Triangle, p: Point) -> bool {
    let center = tri.circumcenter;
    let radius_sq = center.distance_sq(&points[tri.vertices[0]]);
    center.distance_sq(&p) <= radius_sq + 1e-9
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct UndirectedEdge {
    a: usize,
    b: usize,
}

impl UndirectedEdge {
    fn new(a: usize, b: usize) -> Self {
        if a < b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// Triangulates `points` (requires at least 3). Returns triangles referencing only the original
/// point indices; the super-triangle used internally is removed before returning.
#[must_use]
pub fn triangulate(points: &[Point]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut working: Vec<Point> = points.to_vec();
    let n = working.len();

    let (min_x, max_x, min_y, max_y) = bounding_box(&working);
    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta_max = dx.max(dy).max(1.0);
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    let super_a = n;
    let super_b = n + 1;
    let super_c = n + 2;
    working.push(Point::new(mid_x - 20.0 * delta_max, mid_y - delta_max));
    working.push(Point::new(mid_x, mid_y + 20.0 * delta_max));
    working.push(Point::new(mid_x + 20.0 * delta_max, mid_y - delta_max));

    let mut triangles = vec![Triangle {
        vertices: [super_a, super_b, super_c],
        circumcenter: circumcenter(working[super_a], working[super_b], working[super_c]),
    }];

    for i in 0..n {
        let point = working[i];
        let mut bad: Vec<usize> = Vec::new();
        for (idx, tri) in triangles.iter().enumerate() {
            if in_circumcircle(&working, tri, point) {
                bad.push(idx);
            }
        }

        // Boundary of the polygonal hole: edges of bad triangles not shared with another bad
        // triangle.
        let mut edge_count: std::collections::HashMap<UndirectedEdge, u32> =
            std::collections::HashMap::new();
        let mut edge_order: Vec<UndirectedEdge> = Vec::new();
        for &bad_idx in &bad {
            let tri = triangles[bad_idx];
            let edges = [
                UndirectedEdge::new(tri.vertices[0], tri.vertices[1]),
                UndirectedEdge::new(tri.vertices[1], tri.vertices[2]),
                UndirectedEdge::new(tri.vertices[2], tri.vertices[0]),
            ];
            for e in edges {
                if !edge_count.contains_key(&e) {
                    edge_order.push(e);
                }
                *edge_count.entry(e).or_insert(0) += 1;
            }
        }
        let boundary: Vec<UndirectedEdge> = edge_order
            .into_iter()
            .filter(|e| edge_count[e] == 1)
            .collect();

        // Remove bad triangles (descending indices so earlier ones stay valid).
        let mut bad_sorted = bad.clone();
        bad_sorted.sort_unstable_by(|a, b| b.cmp(a));
        for idx in bad_sorted {
            triangles.remove(idx);
        }

        for edge in boundary {
            triangles.push(Triangle {
                vertices: [edge.a, edge.b, i],
                circumcenter: circumcenter(working[edge.a], working[edge.b], working[i]),
            });
        }
    }

    triangles.retain(|tri| {
        !tri.vertices.contains(&super_a)
            && !tri.vertices.contains(&super_b)
            && !tri.vertices.contains(&super_c)
    });

    triangles
}

fn bounding_box(points: &[Point]) -> (f64, f64, f64, f64) {
    let mut min_x = points[0].x;
    let mut max_x = points[0].x;
    let mut min_y = points[0].y;
    let mut max_y = points[0].y;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (min_x, max_x, min_y, max_y)
}
