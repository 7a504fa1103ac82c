//! Stream Router Library
//!
//! Gas-aware trade routing over an in-memory graph of liquidity pools. Given
//! an amount of one currency and a target currency, the router finds the
//! route, or set of routes, that yields the most output (exact-input) or
//! needs the least input (exact-output) after netting out gas costs.
//!
//! # Architecture Overview
//!
//! - **`pool`**: Constant-product, concentrated and stable pool pricing
//! - **`graph`**: Currencies as vertices, pools as edges, with route application
//! - **`quoter`**: The suspending quote interface the search calls pools through
//! - **`price`**: Base-currency valuation used to compare quotes and value gas
//! - **`gas`**: Gas units per pool type and the gas-price source
//! - **`split`**: Exact partitioning of a trade amount into streams
//! - **`route`**: Best-route search for one stream and merging of stream routes
//! - **`trade`**: Trade direction and the aggregate result
//! - **`router`**: The entry point tying the above together
//! - **`builders`**: Fluent construction of graphs and requests
//! - **`snapshot`**: JSON pool snapshots
//! - **`config`**: Environment-based configuration
//! - **`errors`**: Error types for every component
//! - **`utils`**: Chain tables, parsing and exact-number conversions
//!
//! # Core Concepts
//!
//! - **Stream**: One share of the trade amount, routed on its own. Streams are
//!   routed sequentially and each one sees the pool states left by the last.
//! - **Route**: A path of pools carrying one or more streams, with its share
//!   of the trade and its gas estimate.
//! - **Trade**: All routes of one routing call plus the aggregate amounts.
//!
//! # Concurrency
//!
//! Routing takes the graph by `&mut`, so one graph serves one routing call at
//! a time. Build a graph per call, or clone one, to route concurrently.

pub mod builders;
pub mod config;
pub mod currency;
pub mod errors;
pub mod gas;
pub mod graph;
pub mod pool;
pub mod price;
pub mod quoter;
pub mod route;
pub mod router;
pub mod snapshot;
pub mod split;
pub mod trade;
pub mod utils;

// Re-export the main Result type and error enum for convenience
pub use errors::{Result, RouterError};

pub use builders::{RoutingGraphBuilder, TradeRequestBuilder};
pub use config::RouterConfig;
pub use currency::{Currency, CurrencyAmount};
pub use gas::{GasModel, GasPriceSource};
pub use graph::RoutingGraph;
pub use pool::{ConcentratedPool, ConstantProductPool, Pool, PoolType, StablePool};
pub use quoter::{LocalQuoter, PoolQuoter, QuoteRequest};
pub use route::{Route, RouteType};
pub use router::{Router, TradeRequest};
pub use snapshot::Snapshot;
pub use split::Streams;
pub use trade::{Trade, TradeType};

// Module-specific result types for better ergonomics
pub type QuoteResult<T> = std::result::Result<T, errors::QuoteError>;
pub type RouteResult<T> = std::result::Result<T, errors::RouteError>;
