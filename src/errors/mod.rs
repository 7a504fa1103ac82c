//! Error handling for the routing library.
//!
//! Errors are grouped by the component that raises them and folded into a
//! single top-level [`RouterError`] so callers can use `?` everywhere and still
//! match on the precise failure when they need to.
//!
//! # Error Hierarchy
//!
//! - **`GraphError`**: graph construction, lookups and route application
//! - **`QuoteError`**: a single pool rejecting a quote request
//! - **`RouteError`**: search, stream splitting and aggregation failures
//! - **`ConfigError`**: invalid configuration values
//! - **`UtilityError`**: address parsing, chain tables and amount parsing
//!
//! # Recovery
//!
//! Only `QuoteError` is recovered inside the library: the route search skips
//! the edge whose pool rejected the amount. Every other error ends the routing
//! call, and the caller receives either a complete trade or one error. There is
//! no retry policy here; retrying with other parameters is up to the caller.

pub mod config;
pub mod graph;
pub mod quote;
pub mod route;
pub mod utility;

// Re-export all error types for convenience
pub use config::ConfigError;
pub use graph::GraphError;
pub use quote::QuoteError;
pub use route::RouteError;
pub use utility::UtilityError;

/// Main result type for the library
pub type Result<T> = std::result::Result<T, RouterError>;

/// Top-level error enum that encompasses all possible errors in the routing library.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Error in graph construction, lookup or route application.
    #[error("Graph operation failed: {0}")]
    Graph(#[from] GraphError),

    /// A pool rejected a quote outside of the search loop.
    #[error("Quote failed: {0}")]
    Quote(#[from] QuoteError),

    /// Error while searching, splitting or aggregating routes.
    ///
    /// This includes the terminal `NoRouteFound` and `NoStreamRoute`
    /// outcomes as well as invalid request parameters.
    #[error("Routing failed: {0}")]
    Route(#[from] RouteError),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error in utility functions or type conversions.
    #[error("Utility error: {0}")]
    Utility(#[from] UtilityError),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while reading snapshots.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for cases not covered by specific error types.
    #[error("Generic error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RouterError {
    /// Whether this error means no route exists for the request as posed.
    ///
    /// Callers use this to decide whether relaxing the request (more hops,
    /// fewer streams, fresher pool data) is worth trying.
    pub fn is_no_route(&self) -> bool {
        match self {
            RouterError::Route(RouteError::NoRouteFound { .. }) => true,
            RouterError::Route(RouteError::NoStreamRoute { source, .. }) => {
                matches!(source.as_ref(), RouteError::NoRouteFound { .. })
            }
            _ => false,
        }
    }
}
