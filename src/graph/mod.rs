//! Routing graph over liquidity pools.
//!
//! This module provides the arena the router searches: vertices are
//! currencies and edges are pools. The graph owns every pool value; searches
//! borrow it immutably and only [`RoutingGraph::apply_route`] advances pool
//! state, which keeps the aliasing rules of multi-stream routing explicit.

pub mod core;
pub mod types;

// Re-export all public types for convenience
pub use self::core::RoutingGraph;
pub use types::{Edge, EdgeId, EdgeKey, Vertex, VertexId};
