//! Shortest routes between located postal records
//!
//! A complete pairwise distance graph is too dense to search, so every
//! location is first reduced to its K nearest neighbors and Dijkstra runs on
//! the resulting sparse directed graph, with great-circle distance as edge
//! weight.
//!
//! # Architecture
//!
//! - **[`geo`]**: haversine distance and the flat degree-space metric
//! - **[`KdTree`]**: arena-backed 2-D tree for K-nearest-neighbor queries
//! - **[`Strategy`]**: exhaustive or KD-tree accelerated graph construction
//! - **[`Graph`]**: adjacency lists over a borrowed location slice
//! - **[`shortest_path`]** / **[`find_route`]**: Dijkstra and the full query

pub mod builder;
pub mod dijkstra;
pub mod geo;
pub mod graph;
pub mod kdtree;
pub mod model;
pub mod route;

pub use builder::{build_exhaustive, build_indexed, Strategy};
pub use dijkstra::shortest_path;
pub use graph::{Edge, Graph};
pub use kdtree::{KdTree, KdTreeError, Neighbor};
pub use model::{Axis, Location, RouteResult};
pub use pinroute_common::{Error, Result};
pub use route::find_route;

/// Neighbor count used when the caller does not choose one
pub const DEFAULT_NEIGHBORS: usize = 30;
