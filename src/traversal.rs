//! Biased spanning-tree-plus-coverage traversal graph over Voronoi cell adjacency.

use std::collections::BTreeSet;

use crate::geometry::Point;
use crate::seed::Rng;
use crate::voronoi::VoronoiDiagram;

/// One chosen connection between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub cell_a: usize,
    pub cell_b: usize,
    pub edge_index: usize,
    pub point_on_edge: Point,
    pub edge_length: f64,
}

/// The traversal graph built over one [`VoronoiDiagram`].
#[derive(Debug, Clone)]
pub struct TraversalGraph {
    pub total_neighbor_pairs: usize,
    pub target_connections: usize,
    pub connections: Vec<Connection>,
    pub connected_pairs: BTreeSet<(usize, usize)>,
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Unions the sets containing `a` and `b`; returns `true` if they were previously distinct.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

#[derive(Clone, Copy)]
struct Candidate {
    edge_index: usize,
    cell_a: usize,
    cell_b: usize,
    length: f64,
}

/// Samples a point along `from -> to` using a cubic smoothstep of `t`, biased toward the
/// midpoint as `scaling` shrinks toward 0.
fn sample_edge_point(rng: &mut Rng, from: Point, to: Point, scaling: f64) -> Point {
    let t = rng.next_f32() as f64;
    let s = 3.0 * t * t - 2.0 * t * t * t;
    let bias = (s - 0.5) * scaling + 0.5;
    Point::new(from.x + bias * (to.x - from.x), from.y + bias * (to.y - from.y))
}

/// Builds the traversal graph: a biased spanning tree (Phase A) topped up to a neighbour
/// coverage ratio (Phase B).
#[must_use]
pub fn build(
    diagram: &VoronoiDiagram,
    neighbor_ratio: f64,
    traversal_seed: u64,
    include_border_edges: bool,
    connection_distribution_scaling: f64,
) -> TraversalGraph {
    let n = diagram.cells.len();
    let mut rng = Rng::new(traversal_seed);

    let total_neighbor_pairs: usize = diagram.edges.len();

    let candidates: Vec<Candidate> = diagram
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| (include_border_edges || !e.is_border) && e.length() > 0.0)
        .map(|(idx, e)| Candidate {
            edge_index: idx,
            cell_a: e.seed_a,
            cell_b: e.seed_b,
            length: e.length(),
        })
        .collect();

    let mut connections: Vec<Connection> = Vec::new();
    let mut connected_pairs: BTreeSet<(usize, usize)> = BTreeSet::new();

    if n >= 2 {
        let mut sorted_desc = candidates.clone();
        sorted_desc.sort_by(|a, b| b.length.partial_cmp(&a.length).unwrap());

        let mut uf = UnionFind::new(n);
        let mut components_remaining = n;

        for cand in sorted_desc {
            if components_remaining == 1 {
                break;
            }
            if uf.union(cand.cell_a, cand.cell_b) {
                components_remaining -= 1;
                let edge = diagram.edges[cand.edge_index];
                let point_on_edge = sample_edge_point(
                    &mut rng,
                    edge.from,
                    edge.to,
                    connection_distribution_scaling,
                );
                connections.push(Connection {
                    cell_a: cand.cell_a,
                    cell_b: cand.cell_b,
                    edge_index: cand.edge_index,
                    point_on_edge,
                    edge_length: cand.length,
                });
                connected_pairs.insert(pair_key(cand.cell_a, cand.cell_b));
            }
        }
    }

    let target_connections = connections
        .len()
        .max((neighbor_ratio * total_neighbor_pairs as f64).ceil() as usize);

    let mut pool: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !connected_pairs.contains(&pair_key(c.cell_a, c.cell_b)))
        .collect();
    let initial_remaining = pool.len();
    let max_attempts = 5 * initial_remaining;
    let mut attempts = 0usize;

    while connections.len() < target_connections && !pool.is_empty() && attempts < max_attempts {
        attempts += 1;

        let mut cumulative: Vec<f64> = Vec::with_capacity(pool.len());
        let mut running = 0.0;
        for c in &pool {
            running += c.length;
            cumulative.push(running);
        }
        let total = running;
        if total <= 0.0 {
            break;
        }

        let pick = rng.next_f32() as f64 * total;
        let chosen_idx = match cumulative
            .iter()
            .position(|&cum| cum >= pick)
        {
            Some(i) => i,
            None => cumulative.len() - 1,
        };

        let chosen = pool.remove(chosen_idx);
        let pair = pair_key(chosen.cell_a, chosen.cell_b);
        if connected_pairs.contains(&pair) {
            continue;
        }

        let edge = diagram.edges[chosen.edge_index];
        let point_on_edge =
            sample_edge_point(&mut rng, edge.from, edge.to, connection_distribution_scaling);
        connections.push(Connection {
            cell_a: chosen.cell_a,
            cell_b: chosen.cell_b,
            edge_index: chosen.edge_index,
            point_on_edge,
            edge_length: chosen.length,
        });
        connected_pairs.insert(pair);
    }

    TraversalGraph {
        total_neighbor_pairs,
        target_connections,
        connections,
        connected_pairs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voronoi;

    fn sample_diagram() -> VoronoiDiagram {
        let seeds = [
            Point::new(4.0, 4.0),
            Point::new(16.0, 4.0),
            Point::new(10.0, 16.0),
            Point::new(10.0, 10.0),
            Point::new(18.0, 18.0),
        ];
        voronoi::build(&seeds, 24, 24)
    }

    #[test]
    fn spanning_tree_connects_every_cell() {
        let diagram = sample_diagram();
        let graph = build(&diagram, 0.0, 99, true, 1.0);

        let mut uf = UnionFind::new(diagram.cells.len());
        for c in &graph.connections {
            uf.union(c.cell_a, c.cell_b);
        }
        let root = uf.find(0);
        for i in 1..diagram.cells.len() {
            assert_eq!(uf.find(i), root, "cell {i} is disconnected");
        }
    }

    #[test]
    fn full_coverage_connects_every_neighbor_pair() {
        let diagram = sample_diagram();
        let graph = build(&diagram, 1.0, 7, true, 0.5);
        assert_eq!(graph.connections.len(), graph.total_neighbor_pairs);
    }

    #[test]
    fn is_deterministic_for_identical_inputs() {
        let diagram = sample_diagram();
        let a = build(&diagram, 0.5, 42, true, 0.5);
        let b = build(&diagram, 0.5, 42, true, 0.5);
        assert_eq!(a.connections.len(), b.connections.len());
        for (x, y) in a.connections.iter().zip(b.connections.iter()) {
            assert_eq!(x.cell_a, y.cell_a);
            assert_eq!(x.cell_b, y.cell_b);
            assert_eq!(x.point_on_edge, y.point_on_edge);
        }
    }

    #[test]
    fn every_connection_has_a_real_edge_between_its_cells() {
        let diagram = sample_diagram();
        let graph = build(&diagram, 0.5, 5, true, 0.5);
        for c in &graph.connections {
            let edge = diagram.edges[c.edge_index];
            let pair = pair_key(edge.seed_a, edge.seed_b);
            assert_eq!(pair, pair_key(c.cell_a, c.cell_b));
        }
    }

    #[test]
    fn two_cell_graph_connects_with_single_edge() {
        let seeds = [Point::new(5.0, 10.0), Point::new(15.0, 10.0)];
        let diagram = voronoi::build(&seeds, 20, 20);
        let graph = build(&diagram, 0.0, 3, true, 1.0);
        assert_eq!(graph.connections.len(), 1);
    }
}
