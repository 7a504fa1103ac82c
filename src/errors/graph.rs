//! Graph construction, lookup and route application errors.

use super::QuoteError;
use alloy::primitives::Address;

/// Errors that can occur during graph operations
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid graph: no vertex for currency {address}")]
    InvalidGraph { address: Address },

    #[error("Invalid edge: pool {pool} does not connect {token0} and {token1}")]
    InvalidEdge {
        pool: Address,
        token0: Address,
        token1: Address,
    },

    #[error("Invalid vertex index: {index}")]
    InvalidVertexIndex { index: usize },

    #[error("Invalid edge index: {index}")]
    InvalidEdgeIndex { index: usize },

    #[error("Invalid token count for pool {pool}: expected at least 2, got {count}")]
    InvalidTokenCount { pool: Address, count: usize },

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("Applying route failed at pool {pool}: {source}")]
    ApplyRouteFailed {
        pool: Address,
        #[source]
        source: QuoteError,
    },
}
