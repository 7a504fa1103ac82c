//! Vertex and edge records of the routing graph.
//!
//! This module contains the fundamental types used throughout the graph system:
//! - Type aliases for vertex and edge handles
//! - Vertex representation (a currency and its incident edges)
//! - Edge representation (a pool connecting two vertices)
//! - Edge identity keys

use crate::currency::Currency;
use crate::pool::{Pool, PoolKey, PoolType};

/// Handle of a vertex within one graph
pub type VertexId = usize;

/// Handle of an edge within one graph
pub type EdgeId = usize;

/// A tradable currency and the edges that touch it.
#[derive(Debug, Clone)]
pub struct Vertex {
    currency: Currency,
    edges: Vec<EdgeId>,
}

impl Vertex {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            edges: Vec::new(),
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Incident edges in insertion order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn add_edge(&mut self, edge_id: EdgeId) {
        if !self.edges.contains(&edge_id) {
            self.edges.push(edge_id);
        }
    }
}

/// Identity of an edge: the chain and the pool serving the sorted token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub chain_id: u64,
    pub pool: PoolKey,
}

/// An undirected connection between two vertices backed by one pool.
#[derive(Debug, Clone)]
pub struct Edge {
    key: EdgeKey,
    vertices: [VertexId; 2],
    pool: Pool,
}

impl Edge {
    pub fn new(key: EdgeKey, vertices: [VertexId; 2], pool: Pool) -> Self {
        Self { key, vertices, pool }
    }

    pub fn key(&self) -> &EdgeKey {
        &self.key
    }

    pub fn vertices(&self) -> [VertexId; 2] {
        self.vertices
    }

    /// The pool state this edge currently trades against
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool.pool_type()
    }

    /// The vertex across the edge from `vertex`, if `vertex` is an endpoint.
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        match self.vertices {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }

    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        self.other(a) == Some(b)
    }

    /// Swap in the post-trade pool state.
    pub(crate) fn replace_pool(&mut self, pool: Pool) -> Pool {
        std::mem::replace(&mut self.pool, pool)
    }
}
