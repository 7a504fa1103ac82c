//! Builder pattern for RoutingGraph

use crate::currency::Currency;
use crate::errors::Result;
use crate::graph::RoutingGraph;
use crate::pool::Pool;

/// Builder for creating RoutingGraph instances with a fluent API
#[derive(Debug, Clone, Default)]
pub struct RoutingGraphBuilder {
    currencies: Vec<Currency>,
    pools: Vec<Pool>,
}

impl RoutingGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a currency even if no pool trades it yet.
    pub fn add_currency(mut self, currency: Currency) -> Self {
        self.currencies.push(currency);
        self
    }

    pub fn add_pool(mut self, pool: impl Into<Pool>) -> Self {
        self.pools.push(pool.into());
        self
    }

    /// Add multiple pools to the graph
    pub fn add_pools<I>(mut self, pools: I) -> Self
    where
        I: IntoIterator<Item = Pool>,
    {
        self.pools.extend(pools);
        self
    }

    /// Build the RoutingGraph
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenCount` if any pool trades fewer than two tokens
    pub fn build(self) -> Result<RoutingGraph> {
        let mut graph = RoutingGraph::new();
        for currency in self.currencies {
            graph.add_vertex(currency);
        }
        for pool in self.pools {
            graph.add_pool(pool)?;
        }

        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            pools = graph.pool_count(),
            "Routing graph built"
        );
        Ok(graph)
    }
}
