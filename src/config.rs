//! Serializable parameter surface for [`crate::generate`].

use serde::{Deserialize, Serialize};

/// Poisson-disk sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonParams {
    /// Minimum seed separation. Must be `> 0`.
    pub radius: f64,
    /// Rejection samples drawn per active point before it's retired.
    pub attempts: u32,
    /// Border keep-out in pixels; seeds are sampled inside the padded rectangle then offset.
    pub seed_padding: i32,
}

impl Default for PoissonParams {
    fn default() -> Self {
        Self {
            radius: 20.0,
            attempts: 30,
            seed_padding: 8,
        }
    }
}

/// Traversal-graph parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalParams {
    /// Target ratio in `[0, 1]` of neighbour pairs connected after Phase B.
    pub neighbor_coverage: f64,
    /// Edge-sample bias in `[0, 1]`; `0` = midpoint, `1` = full smoothstep spread.
    pub connection_distribution_scaling: f64,
    /// Whether canvas-border edges may host connections.
    pub include_border_edges: bool,
}

impl Default for TraversalParams {
    fn default() -> Self {
        Self {
            neighbor_coverage: 0.5,
            connection_distribution_scaling: 0.5,
            include_border_edges: true,
        }
    }
}

/// Raw cellular automata rule parameters, validated into a [`crate::cellular_automata::CaConfig`]
/// by [`crate::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaParams {
    pub kernel_size: u32,
    pub birth_limit: u32,
    pub survival_limit: u32,
    pub iterations: u32,
    pub initial_wall_probability: f64,
    pub connector_depth: u32,
}

impl Default for CaParams {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            birth_limit: 4,
            survival_limit: 3,
            iterations: 4,
            initial_wall_probability: 0.45,
            connector_depth: 3,
        }
    }
}

/// Top-level parameter block consumed by [`crate::generate`]. Everything but `base_seed` and
/// `canvas_width`/`canvas_height` has a sensible default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateParams {
    pub base_seed: u64,
    pub canvas_width: i32,
    pub canvas_height: i32,
    pub poisson: PoissonParams,
    pub traversal: TraversalParams,
    /// Extra pixels around each cell's CA region.
    pub cell_padding: i32,
    pub ca: CaParams,
    /// Max concurrent CA workers; `<= 0` means hardware default.
    pub parallelism: i32,
    /// Pinned override for `poisson_seed`; `None` or `Some(0)` derives it from `base_seed`.
    pub poisson_seed_override: Option<u64>,
    /// Pinned override for `traversal_seed`; `None` or `Some(0)` derives it from `base_seed`.
    pub traversal_seed_override: Option<u64>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            base_seed: 0,
            canvas_width: 128,
            canvas_height: 128,
            poisson: PoissonParams::default(),
            traversal: TraversalParams::default(),
            cell_padding: 2,
            ca: CaParams::default(),
            parallelism: 0,
            poisson_seed_override: None,
            traversal_seed_override: None,
        }
    }
}
