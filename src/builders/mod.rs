//! Fluent builders for graphs and trade requests.
//!
//! Builders consume themselves on every step and validate in `build`, so a
//! half-configured value never escapes.
//!
//! - **`RoutingGraphBuilder`**: collects pools and extra currencies, then builds a graph
//! - **`TradeRequestBuilder`**: assembles a trade request, optionally seeded from config

pub mod graph;
pub mod request;

pub use graph::RoutingGraphBuilder;
pub use request::TradeRequestBuilder;
