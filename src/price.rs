//! Base-currency valuation of graph vertices.
//!
//! The route search compares quotes that land in different currencies and
//! nets out gas paid in the native currency. Both need a common unit: the
//! trade's base currency (the currency of the requested amount). Prices are
//! derived once per routing call from pool mid prices, walking the graph
//! breadth-first from the base vertex; the first path that reaches a vertex
//! fixes its price.
//!
//! Principal amounts never go through these prices. They only rank
//! candidates and value gas.

use crate::graph::{RoutingGraph, VertexId};
use crate::utils::{to_rational, wrapped_native_address};
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::{HashMap, VecDeque};

/// Vertex prices in raw base units per raw unit of the vertex's currency.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    base: VertexId,
    prices: HashMap<VertexId, BigRational>,
    /// Gas price in wei of the native currency
    gas_price: BigUint,
    /// Price of one wei in base units, when the native currency is priced
    native_price: Option<BigRational>,
}

impl PriceCalculator {
    /// Price every vertex reachable from `base` on the graph's current state.
    pub fn new(graph: &RoutingGraph, base: VertexId, gas_price: BigUint) -> Self {
        let prices = Self::discover_prices(graph, base);
        let native_price = Self::native_price(graph, base, &prices);

        tracing::debug!(
            base = base,
            priced_vertices = prices.len(),
            gas_price = %gas_price,
            native_priced = native_price.is_some(),
            "Price calculator initialised"
        );

        Self {
            base,
            prices,
            gas_price,
            native_price,
        }
    }

    fn discover_prices(graph: &RoutingGraph, base: VertexId) -> HashMap<VertexId, BigRational> {
        let mut prices = HashMap::new();
        prices.insert(base, BigRational::one());
        let mut queue = VecDeque::from([base]);

        while let Some(current) = queue.pop_front() {
            let current_price = match prices.get(&current) {
                Some(price) => price.clone(),
                None => continue,
            };
            let Ok(vertex) = graph.vertex(current) else {
                continue;
            };
            let Ok(adjacent) = graph.adjacent(current) else {
                continue;
            };

            for (edge_id, neighbour) in adjacent {
                if prices.contains_key(&neighbour) {
                    continue;
                }
                let (Ok(edge), Ok(next)) = (graph.edge(edge_id), graph.vertex(neighbour)) else {
                    continue;
                };
                // raw `current` units per raw `neighbour` unit
                let Some(mid) = edge.pool().mid_price(next.currency(), vertex.currency()) else {
                    continue;
                };
                prices.insert(neighbour, &current_price * mid);
                queue.push_back(neighbour);
            }
        }

        prices
    }

    fn native_price(
        graph: &RoutingGraph,
        base: VertexId,
        prices: &HashMap<VertexId, BigRational>,
    ) -> Option<BigRational> {
        let chain_id = graph.vertex(base).ok()?.currency().chain_id();
        let native = match wrapped_native_address(chain_id) {
            Ok(address) => address,
            Err(error) => {
                tracing::warn!(chain_id = chain_id, error = %error, "No native currency for chain, gas will be valued at zero");
                return None;
            }
        };

        let price = graph
            .vertex_id_by_address(chain_id, native)
            .and_then(|vertex| prices.get(&vertex))
            .cloned();
        if price.is_none() {
            tracing::warn!(
                chain_id = chain_id,
                native = %native,
                "Native currency is not priced from the base currency, gas will be valued at zero"
            );
        }
        price
    }

    pub fn base(&self) -> VertexId {
        self.base
    }

    pub fn gas_price(&self) -> &BigUint {
        &self.gas_price
    }

    /// Raw base units per raw unit of `vertex`, if it is reachable.
    pub fn price_in_base(&self, vertex: VertexId) -> Option<BigRational> {
        self.prices.get(&vertex).cloned()
    }

    /// Value `amount` raw units of `vertex` in raw base units.
    pub fn value_in_base(&self, vertex: VertexId, amount: &BigUint) -> Option<BigRational> {
        self.prices.get(&vertex).map(|price| price * to_rational(amount))
    }

    /// Cost of `gas_units` in raw base units.
    ///
    /// Zero when the native currency cannot be priced from the base currency.
    pub fn gas_cost_in_base(&self, gas_units: u64) -> BigRational {
        match &self.native_price {
            Some(native_price) => {
                to_rational(&(&self.gas_price * gas_units)) * native_price
            }
            None => BigRational::zero(),
        }
    }

    /// Cost of `gas_units` in raw units of `vertex`.
    ///
    /// Zero when either the native currency or `vertex` is unpriced.
    pub fn gas_cost_in(&self, vertex: VertexId, gas_units: u64) -> BigRational {
        match self.prices.get(&vertex) {
            Some(price) if !price.is_zero() => self.gas_cost_in_base(gas_units) / price,
            _ => BigRational::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::pool::test_utils::{constant_product, currency};
    use alloy::primitives::Address;
    use num_bigint::BigInt;

    fn weth() -> Currency {
        Currency::token(1, wrapped_native_address(1).unwrap(), 18, "WETH")
    }

    fn ratio(numerator: i64, denominator: i64) -> BigRational {
        BigRational::new(BigInt::from(numerator), BigInt::from(denominator))
    }

    #[test]
    fn test_prices_follow_mid_prices_breadth_first() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let c = currency(0x03, "C");
        let graph = RoutingGraph::from_pools(vec![
            constant_product(0xa1, &a, &b, 1_000, 2_000),
            constant_product(0xa2, &b, &c, 1_000, 4_000),
        ])
        .unwrap();
        let base = graph.find_vertex(&a).unwrap();

        let calculator = PriceCalculator::new(&graph, base, BigUint::zero());

        assert_eq!(calculator.price_in_base(base).unwrap(), BigRational::one());
        // 1 B is worth 1/2 A, 1 C is worth 1/4 B
        let vb = graph.find_vertex(&b).unwrap();
        let vc = graph.find_vertex(&c).unwrap();
        assert_eq!(calculator.price_in_base(vb).unwrap(), ratio(1, 2));
        assert_eq!(calculator.price_in_base(vc).unwrap(), ratio(1, 8));
        assert_eq!(
            calculator.value_in_base(vc, &BigUint::from(80u32)).unwrap(),
            ratio(10, 1)
        );
    }

    #[test]
    fn test_gas_is_valued_through_wrapped_native() {
        let usdc = Currency::token(1, Address::repeat_byte(0x02), 6, "USDC");
        let weth = weth();
        // 1 WETH = 2000 USDC
        let graph = RoutingGraph::from_pools(vec![constant_product(
            0xa1,
            &usdc,
            &weth,
            2_000_000_000,
            1_000_000_000_000_000_000,
        )])
        .unwrap();
        let base = graph.find_vertex(&usdc).unwrap();

        let calculator = PriceCalculator::new(&graph, base, BigUint::from(10_000_000_000u64));

        // 100k gas at 10 gwei = 0.001 WETH = 2 USDC
        assert_eq!(calculator.gas_cost_in_base(100_000), ratio(2_000_000, 1));
        let vweth = graph.find_vertex(&weth).unwrap();
        assert_eq!(
            calculator.gas_cost_in(vweth, 100_000),
            ratio(1_000_000_000_000_000, 1)
        );
    }

    #[test]
    fn test_unpriced_native_means_zero_gas() {
        let a = currency(0x01, "A");
        let b = currency(0x02, "B");
        let graph =
            RoutingGraph::from_pools(vec![constant_product(0xa1, &a, &b, 1_000, 1_000)]).unwrap();
        let base = graph.find_vertex(&a).unwrap();

        let calculator = PriceCalculator::new(&graph, base, BigUint::from(1_000_000_000u64));

        assert!(calculator.gas_cost_in_base(90_000).is_zero());
    }
}
