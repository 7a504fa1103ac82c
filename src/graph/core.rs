//! Core routing graph implementation.
//!
//! This module contains the main `RoutingGraph` struct: construction from a
//! pool list, lookups by currency and by (pool, vertex pair), and the single
//! pool-mutating operation, [`RoutingGraph::apply_route`].

use super::types::{Edge, EdgeId, EdgeKey, Vertex, VertexId};
use crate::currency::Currency;
use crate::errors::{GraphError, Result};
use crate::pool::{Pool, PoolKey};
use crate::quoter::{PoolQuoter, QuoteRequest};
use crate::route::Route;
use crate::trade::TradeType;
use alloy::primitives::Address;
use std::collections::HashMap;

/// An arena of vertices (currencies) and edges (pools).
///
/// The `RoutingGraph` represents a network where:
/// - Vertices are currencies, deduplicated by chain and canonical address
/// - Edges are pools serving one currency pair; a multi-asset pool backs one
///   edge per pair
/// - Handles (`VertexId`, `EdgeId`) stay valid for the lifetime of the graph
///
/// Topology never changes once a pool is added. Pool state only moves forward
/// through [`apply_route`](Self::apply_route).
#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// (chain id, canonical address) to vertex
    vertex_index: HashMap<(u64, Address), VertexId>,
    edge_index: HashMap<EdgeKey, EdgeId>,
    /// Every edge backed by a given pool
    pool_edges: HashMap<PoolIdentity, Vec<EdgeId>>,
}

/// A pool's address together with its sorted token addresses.
///
/// Pools behind a shared contract (a singleton pool manager) have the same
/// address but different token sets, so the address alone does not identify
/// a pool.
type PoolIdentity = (Address, Vec<Address>);

fn pool_identity(pool: &Pool) -> PoolIdentity {
    let mut tokens: Vec<Address> = pool
        .tokens()
        .iter()
        .map(|token| token.canonical_address())
        .collect();
    tokens.sort_unstable();
    (pool.address(), tokens)
}

impl RoutingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a list of pools.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenCount` if a pool trades fewer than two tokens
    pub fn from_pools<I>(pools: I) -> Result<Self>
    where
        I: IntoIterator<Item = Pool>,
    {
        let mut graph = Self::new();
        for pool in pools {
            graph.add_pool(pool)?;
        }

        tracing::info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            pools = graph.pool_count(),
            "Routing graph built"
        );
        Ok(graph)
    }

    // ================================
    // Construction Methods
    // ================================

    /// Get or create the vertex of `currency`.
    pub fn add_vertex(&mut self, currency: Currency) -> VertexId {
        let key = (currency.chain_id(), currency.canonical_address());
        if let Some(&existing_id) = self.vertex_index.get(&key) {
            return existing_id;
        }

        let vertex_id = self.vertices.len();
        self.vertices.push(Vertex::new(currency));
        self.vertex_index.insert(key, vertex_id);
        vertex_id
    }

    /// Add a pool, creating one edge per tradable pair.
    ///
    /// Adding a pool that is already present for a pair reuses the existing
    /// edge, so building from the same pool list twice yields the same graph.
    ///
    /// # Returns
    ///
    /// The edge IDs backed by this pool, one per pair
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenCount` if the pool trades fewer than two tokens
    pub fn add_pool(&mut self, pool: Pool) -> Result<Vec<EdgeId>> {
        let token_count = pool.tokens().len();
        if token_count < 2 {
            tracing::error!(
                pool = %pool.address(),
                token_count = token_count,
                "Invalid token count for pool - expected at least 2 tokens"
            );
            return Err(GraphError::InvalidTokenCount {
                pool: pool.address(),
                count: token_count,
            }
            .into());
        }

        let identity = pool_identity(&pool);
        let mut edge_ids = Vec::new();
        for (token_a, token_b) in pool.currency_pairs() {
            let key = EdgeKey {
                chain_id: token_a.chain_id(),
                pool: pool.key(&token_a, &token_b),
            };
            if let Some(&existing_id) = self.edge_index.get(&key) {
                edge_ids.push(existing_id);
                continue;
            }

            let vertex_a = self.add_vertex(token_a);
            let vertex_b = self.add_vertex(token_b);
            let edge_id = self.edges.len();
            self.edges.push(Edge::new(key, [vertex_a, vertex_b], pool.clone()));
            self.edge_index.insert(key, edge_id);
            self.pool_edges.entry(identity.clone()).or_default().push(edge_id);
            self.vertices[vertex_a].add_edge(edge_id);
            self.vertices[vertex_b].add_edge(edge_id);
            edge_ids.push(edge_id);
        }

        tracing::debug!(
            pool = %pool.address(),
            pool_type = %pool.pool_type(),
            token_count = token_count,
            edges = edge_ids.len(),
            "Pool added to graph"
        );
        Ok(edge_ids)
    }

    // ================================
    // Query Methods
    // ================================

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of distinct pools.
    ///
    /// A multi-asset pool counts once even though it backs several edges.
    pub fn pool_count(&self) -> usize {
        self.pool_edges.len()
    }

    /// The vertex of `currency`, if present
    pub fn vertex_id(&self, currency: &Currency) -> Option<VertexId> {
        self.vertex_id_by_address(currency.chain_id(), currency.canonical_address())
    }

    pub fn vertex_id_by_address(&self, chain_id: u64, address: Address) -> Option<VertexId> {
        self.vertex_index.get(&(chain_id, address)).copied()
    }

    /// The vertex of `currency`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGraph` if the currency is not part of the graph
    pub fn find_vertex(&self, currency: &Currency) -> Result<VertexId> {
        self.vertex_id(currency).ok_or_else(|| {
            GraphError::InvalidGraph {
                address: currency.canonical_address(),
            }
            .into()
        })
    }

    pub fn vertex(&self, vertex_id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(vertex_id)
            .ok_or_else(|| GraphError::InvalidVertexIndex { index: vertex_id }.into())
    }

    pub fn edge(&self, edge_id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(edge_id)
            .ok_or_else(|| GraphError::InvalidEdgeIndex { index: edge_id }.into())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up the edge of `pool` between two vertices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEdge` if the pool does not connect the two vertices
    pub fn find_edge(&self, pool: Address, a: VertexId, b: VertexId) -> Result<EdgeId> {
        let currency_a = self.vertex(a)?.currency();
        let currency_b = self.vertex(b)?.currency();
        let key = EdgeKey {
            chain_id: currency_a.chain_id(),
            pool: PoolKey::new(
                currency_a.canonical_address(),
                currency_b.canonical_address(),
                pool,
            ),
        };

        self.edge_index.get(&key).copied().ok_or_else(|| {
            GraphError::InvalidEdge {
                pool,
                token0: key.pool.token0,
                token1: key.pool.token1,
            }
            .into()
        })
    }

    // ================================
    // Navigation Methods
    // ================================

    /// The vertex across `edge_id` from `vertex_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEdge` if `vertex_id` is not an endpoint of the edge
    pub fn neighbour(&self, edge_id: EdgeId, vertex_id: VertexId) -> Result<VertexId> {
        let edge = self.edge(edge_id)?;
        edge.other(vertex_id).ok_or_else(|| {
            GraphError::InvalidEdge {
                pool: edge.pool().address(),
                token0: edge.key().pool.token0,
                token1: edge.key().pool.token1,
            }
            .into()
        })
    }

    /// Iterate `(edge, neighbour)` pairs around a vertex.
    pub fn adjacent(&self, vertex_id: VertexId) -> Result<impl Iterator<Item = (EdgeId, VertexId)> + '_> {
        let vertex = self.vertex(vertex_id)?;
        Ok(vertex.edges().iter().filter_map(move |&edge_id| {
            self.edges
                .get(edge_id)
                .and_then(|edge| edge.other(vertex_id))
                .map(|neighbour| (edge_id, neighbour))
        }))
    }

    // ================================
    // Mutation
    // ================================

    /// Advance every pool along `route` to its post-trade state.
    ///
    /// Pools are re-quoted in path order for exact-input routes (starting from
    /// the route input) and in reverse path order for exact-output routes
    /// (starting from the route output). The post-trade state of a pool is
    /// written to every edge it backs. Pools off the route are untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidRoute` if the route's path and pools disagree in length
    /// - `InvalidGraph` / `InvalidEdge` if the route does not fit this graph
    /// - `ApplyRouteFailed` if a pool rejects the re-quote; pools earlier in
    ///   the application order keep their advanced state
    pub async fn apply_route<Q: PoolQuoter>(&mut self, route: &Route, quoter: &Q) -> Result<()> {
        if route.path.len() != route.pools.len() + 1 {
            return Err(GraphError::InvalidRoute {
                reason: format!(
                    "{} currencies for {} pools",
                    route.path.len(),
                    route.pools.len()
                ),
            }
            .into());
        }

        let mut hops = Vec::with_capacity(route.pools.len());
        for (pool, pair) in route.pools.iter().zip(route.path.windows(2)) {
            let from = self.find_vertex(&pair[0])?;
            let to = self.find_vertex(&pair[1])?;
            hops.push(self.find_edge(pool.address(), from, to)?);
        }

        let (mut amount, order): (_, Vec<usize>) = match route.trade_type {
            TradeType::ExactInput => (route.input_amount.clone(), (0..hops.len()).collect()),
            TradeType::ExactOutput => (route.output_amount.clone(), (0..hops.len()).rev().collect()),
        };

        for index in order {
            let edge = &self.edges[hops[index]];
            let token_in = &route.path[index];
            let token_out = &route.path[index + 1];
            let pool_address = edge.pool().address();

            let quote = quoter
                .quote(QuoteRequest {
                    pool: edge.pool(),
                    token_in,
                    token_out,
                    amount: &amount,
                    trade_type: route.trade_type,
                })
                .await
                .map_err(|source| GraphError::ApplyRouteFailed {
                    pool: pool_address,
                    source,
                })?;

            tracing::debug!(
                pool = %pool_address,
                token_in = %token_in,
                token_out = %token_out,
                amount = %amount,
                quote = %quote.amount,
                "Applied swap to pool"
            );

            self.replace_pool_state(quote.pool_after);
            amount = quote.amount;
        }

        Ok(())
    }

    /// Write a pool's new state to every edge it backs.
    fn replace_pool_state(&mut self, pool: Pool) {
        if let Some(edge_ids) = self.pool_edges.get(&pool_identity(&pool)) {
            for &edge_id in edge_ids {
                self.edges[edge_id].replace_pool(pool.clone());
            }
        }
    }
}
