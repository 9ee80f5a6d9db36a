//! Assignment of request points to server points on the plane.
//!
//! Three strategies share the same [`Point`]/[`Pair`] vocabulary:
//!
//! - [`min_cost_matching`]: offline minimum total cost perfect matching by
//!   successive shortest augmenting paths over a [`BipartiteGraph`].
//! - [`permutation_matching`]: online matching that commits every arriving
//!   request immediately, using the offline solver as an oracle.
//! - [`bottleneck_matching`]: perfect matching minimising the largest single
//!   cost, solved on a dense `nalgebra` matrix.

mod bottleneck;
mod config;
mod error;
mod graph;
mod incremental;
mod min_cost;
mod point;
mod shortest_path;

pub use bottleneck::{bottleneck, bottleneck_matching, cost_matrix, Allocation};
pub use config::MatcherConfig;
pub use error::{MatchingError, Result};
pub use graph::{BipartiteGraph, Edge, EdgeId, NodeId, PathInfo};
pub use incremental::{permutation_matching, IncrementalMatcher};
pub use min_cost::{min_cost_matching, MinCostMatcher};
pub use point::{max_cost, total_cost, Pair, Point};
pub use shortest_path::shortest_paths;
