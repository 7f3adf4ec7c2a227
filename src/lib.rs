//! # caveforge
//!
//! A deterministic, parallel procedural cave/dungeon generator. One integer seed and a small
//! parameter block produce a 2D floor/wall tile grid partitioned into organically connected
//! regions:
//!
//! 1. Deterministic seed derivation ([`seed`]).
//! 2. Poisson-disk blue-noise sampling ([`poisson`]).
//! 3. Delaunay triangulation and Voronoi construction, with a per-pixel ownership grid
//!    ([`delaunay`], [`voronoi`]).
//! 4. A biased spanning-tree-plus-coverage traversal graph over cell adjacency ([`traversal`]).
//! 5. Per-cell masked cellular automata, run in parallel and merged via the ownership grid
//!    ([`ca_prep`], [`cellular_automata`], [`orchestrator`]).
//!
//! ## Quick start
//!
//! ```rust
//! use caveforge::config::GenerateParams;
//!
//! let mut params = GenerateParams::default();
//! params.base_seed = 1;
//! params.canvas_width = 64;
//! params.canvas_height = 64;
//!
//! let result = caveforge::generate(&params).unwrap();
//! println!("{} seeds, {} connections", result.diagram.seeds.len(), result.traversal.connections.len());
//! ```
//!
//! The same `(base_seed, params)` pair always produces byte-identical output, regardless of
//! `parallelism`.

pub mod ca_prep;
pub mod cellular_automata;
pub mod config;
pub mod delaunay;
pub mod error;
pub mod geometry;
pub mod grid2d;
pub mod orchestrator;
pub mod poisson;
pub mod seed;
pub mod traversal;
pub mod voronoi;

pub use config::GenerateParams;
pub use error::{Error, Result};
pub use orchestrator::{generate, MergedResult};
