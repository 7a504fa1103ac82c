//! Route search, stream splitting and aggregation errors.

use alloy::primitives::Address;

/// Errors that can occur while routing a trade
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No route found from {from} to {to} within {max_hops} hops")]
    NoRouteFound {
        from: Address,
        to: Address,
        max_hops: usize,
    },

    #[error("No route for stream {stream} (amount {amount}): {source}")]
    NoStreamRoute {
        stream: usize,
        amount: String,
        #[source]
        source: Box<RouteError>,
    },

    #[error("Invalid streams: {reason}")]
    InvalidStreams { reason: String },

    #[error("Invalid max hops: {max_hops}, must be at least 1")]
    InvalidMaxHops { max_hops: usize },

    #[error("Input and quote currency are the same: {address}")]
    IdenticalCurrencies { address: Address },

    #[error("Gas price unavailable: {reason}")]
    GasPriceUnavailable { reason: String },

    #[error("Routing timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}
