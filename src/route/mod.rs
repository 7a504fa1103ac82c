//! Routes: one path of pools carrying one share of a trade.
//!
//! A [`Route`] is produced by [`RouteSearch`] for a single stream and may be
//! merged with other routes over the same pools by [`merge_routes`]. Paths
//! always read from the input currency to the output currency, whatever the
//! trade direction.

pub mod merge;
pub mod search;

pub use merge::merge_routes;
pub use search::RouteSearch;

use crate::currency::Currency;
use crate::pool::{Pool, PoolKey, PoolType};
use crate::trade::TradeType;
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::fmt;

/// Pool family of a route: one family throughout, or `Mixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    ConstantProduct,
    Concentrated,
    Stable,
    Mixed,
}

impl RouteType {
    /// Classify a sequence of pools.
    pub fn of<'a>(pools: impl IntoIterator<Item = &'a Pool>) -> Self {
        let mut types = pools.into_iter().map(Pool::pool_type);
        let first = match types.next() {
            Some(pool_type) => pool_type,
            None => return RouteType::Mixed,
        };
        if types.all(|pool_type| pool_type == first) {
            first.into()
        } else {
            RouteType::Mixed
        }
    }
}

impl From<PoolType> for RouteType {
    fn from(pool_type: PoolType) -> Self {
        match pool_type {
            PoolType::ConstantProduct => RouteType::ConstantProduct,
            PoolType::Concentrated => RouteType::Concentrated,
            PoolType::Stable => RouteType::Stable,
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteType::Mixed => f.write_str("mixed"),
            RouteType::ConstantProduct => fmt::Display::fmt(&PoolType::ConstantProduct, f),
            RouteType::Concentrated => fmt::Display::fmt(&PoolType::Concentrated, f),
            RouteType::Stable => fmt::Display::fmt(&PoolType::Stable, f),
        }
    }
}

/// A priced path through the graph for one share of the trade.
///
/// `pools[k]` connects `path[k]` and `path[k + 1]`. Pool values are the states
/// that were quoted during the search, before the route was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub route_type: RouteType,
    pub trade_type: TradeType,
    pub path: Vec<Currency>,
    pub pools: Vec<Pool>,
    /// Exact fraction of the requested amount carried by this route
    pub share: BigRational,
    pub input_amount: BigUint,
    pub output_amount: BigUint,
    /// Input plus the gas cost in input currency (exact-output only)
    pub input_amount_with_gas_adjusted: BigUint,
    /// Output minus the gas cost in output currency (exact-input only)
    pub output_amount_with_gas_adjusted: BigUint,
    /// Gas units for every hop of the route
    pub gas_estimate: u64,
    /// Gas cost in raw units of the requested amount's currency
    pub gas_cost_in_base: BigUint,
    /// Gas cost in raw units of the quote currency
    pub gas_cost_in_quote: BigUint,
}

impl Route {
    pub fn input_currency(&self) -> Option<&Currency> {
        self.path.first()
    }

    pub fn output_currency(&self) -> Option<&Currency> {
        self.path.last()
    }

    /// Ordered identities of the pools this route trades through
    pub fn pool_keys(&self) -> Vec<PoolKey> {
        self.pools
            .iter()
            .zip(self.path.windows(2))
            .map(|(pool, pair)| pool.key(&pair[0], &pair[1]))
            .collect()
    }

    /// Share as a display percentage
    pub fn percent(&self) -> f64 {
        (&self.share * BigRational::from_integer(100.into()))
            .to_f64()
            .unwrap_or_default()
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(|currency| currency.symbol().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        write!(
            f,
            "{:.2}% [{}] {} ({} gas, in {}, out {})",
            self.percent(),
            self.route_type,
            path,
            self.gas_estimate,
            self.input_amount,
            self.output_amount
        )
    }
}
